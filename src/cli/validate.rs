use console::style;
use graphsql_lib::{read_edges, read_output, Database, Task, TaskParams, Validation};
use log::info;

/// Recomputes the task in memory and compares it with the output table.
pub fn validate(db: &mut dyn Database, params: &TaskParams) -> Result<bool, Box<dyn std::error::Error>> {
    let edges = read_edges(db, &params.table, &params.source, &params.destination)?;
    let validation = Validation::from_edges(&edges, params.k);

    let (rows, valid) = match params.task {
        Task::Clique => {
            let rows = read_output(db, params.k)?;
            let valid = validation.test_find_cliques(&rows);
            (rows, valid)
        }
        Task::Diameter => {
            let rows = read_output(db, 3)?;
            let valid = validation.test_diameter(&rows);
            (rows, valid)
        }
    };
    info!("Validated {} rows from {} edges", rows.len(), edges.len());

    if valid {
        println!(
            "{} {} rows match",
            style("Validation passed:").green(),
            rows.len()
        );
    } else {
        println!(
            "{} the database returned {} rows",
            style("Validation failed:").red(),
            rows.len()
        );
    }
    Ok(valid)
}
