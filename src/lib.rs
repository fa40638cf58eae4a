pub mod config;
pub mod database;
mod query_builder;
mod task;
pub mod validation;

pub use config::{ConfigError, ConnectionConfig, DatabaseConfig, SshConfig};
pub use database::{
    connect, read_edges, read_output, run_task, Database, DatabaseError, PostgresDatabase,
    SqliteDatabase,
};
pub use query_builder::templates::{CLIQUE_TEMPLATE, DIAMETER_TEMPLATE, OUTPUT_TABLE_NAME};
pub use query_builder::{QueryBuilder, PLACEHOLDERS};
pub use task::{Task, TaskError, TaskParams, USAGE};
pub use validation::{check_lists, SubCliques, Validation};

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn sqlite_with_edges(edges: &[(i64, i64)]) -> Result<SqliteDatabase, DatabaseError> {
        let mut db = SqliteDatabase::open_in_memory()?;
        db.create_edge_table("edges", "src", "dst", edges)?;
        Ok(db)
    }

    fn run(db: &mut SqliteDatabase, task: &str) -> Result<Vec<Vec<i64>>, Box<dyn std::error::Error>> {
        let params: TaskParams = task.parse()?;
        let columns = match params.task {
            Task::Clique => params.k,
            Task::Diameter => 3,
        };
        let mut builder = QueryBuilder::new(params);
        let table = run_task(db, &mut builder)?;
        assert_eq!(table, OUTPUT_TABLE_NAME);
        Ok(read_output(db, columns)?)
    }

    /// `m` random edges over `0..n`, self loops and duplicates included.
    fn random_edges(n: i64, m: usize, seed: u64) -> Vec<(i64, i64)> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..m)
            .map(|_| (rng.gen_range(0..n), rng.gen_range(0..n)))
            .collect()
    }

    #[test]
    fn test_triangle_with_tail() -> Result<(), Box<dyn std::error::Error>> {
        let edges = [(1, 2), (2, 3), (1, 3), (3, 4)];
        let mut db = sqlite_with_edges(&edges)?;

        let cliques = run(&mut db, "task=clique;table=edges;source=src;destination=dst;k=3")?;

        assert_eq!(cliques, vec![vec![1, 2, 3]]);
        let validation = Validation::from_edges(&edges, 3);
        assert!(validation.test_find_cliques(&cliques));
        assert!(!validation.test_find_cliques(&[]));
        assert!(!validation.test_find_cliques(&[vec![1, 2, 3], vec![1, 2, 4]]));
        Ok(())
    }

    #[test]
    fn test_sql_matches_validation_on_random_graphs() -> Result<(), Box<dyn std::error::Error>> {
        for seed in 0..8 {
            let edges = random_edges(9, 24, seed);
            let mut db = sqlite_with_edges(&edges)?;
            for k in 2..=5 {
                let task = format!("task=clique;table=edges;source=src;destination=dst;k={}", k);
                let cliques = run(&mut db, &task)?;

                let validation = Validation::from_edges(&edges, k);
                assert_eq!(cliques, validation.find_cliques(), "seed {} k {}", seed, k);
                assert!(validation.test_find_cliques(&cliques));
            }
        }
        Ok(())
    }

    #[test]
    fn test_k5_clique_counts() -> Result<(), Box<dyn std::error::Error>> {
        // Stored in both directions and with a self loop.
        let mut edges = (0..5).tuple_combinations().collect_vec();
        edges.extend((0..5).tuple_combinations().map(|(a, b)| (b, a)));
        edges.push((2, 2));
        let mut db = sqlite_with_edges(&edges)?;

        for (k, count) in [(2, 10), (3, 10), (4, 5), (5, 1), (6, 0)] {
            let task = format!("task=clique;table=edges;source=src;destination=dst;k={}", k);
            assert_eq!(run(&mut db, &task)?.len(), count, "k {}", k);
        }
        Ok(())
    }

    #[test]
    fn test_rows_are_strictly_increasing() -> Result<(), Box<dyn std::error::Error>> {
        let edges = random_edges(12, 50, 42);
        let mut db = sqlite_with_edges(&edges)?;

        let cliques = run(&mut db, "task=clique;table=edges;source=src;destination=dst;k=4")?;

        assert!(cliques
            .iter()
            .all(|c| c.len() == 4 && c.windows(2).all(|w| w[0] < w[1])));
        Ok(())
    }

    #[test]
    fn test_rerun_replaces_output_table() -> Result<(), Box<dyn std::error::Error>> {
        let mut db = sqlite_with_edges(&[(1, 2), (2, 3), (1, 3)])?;

        assert_eq!(
            run(&mut db, "task=clique;table=edges;source=src;destination=dst;k=2")?.len(),
            3
        );
        assert_eq!(
            run(&mut db, "task=clique;table=edges;source=src;destination=dst;k=3")?,
            vec![vec![1, 2, 3]]
        );
        Ok(())
    }

    #[test]
    fn test_diameter_matches_validation() -> Result<(), Box<dyn std::error::Error>> {
        for seed in 0..6 {
            let edges = random_edges(10, 12, seed);
            let mut db = sqlite_with_edges(&edges)?;
            for k in 1..=4 {
                let task = format!("task=diameter;table=edges;source=src;destination=dst;k={}", k);
                let rows = run(&mut db, &task)?;

                let validation = Validation::from_edges(&edges, k);
                assert_eq!(rows, validation.find_diameter_pairs(), "seed {} k {}", seed, k);
                assert!(validation.test_diameter(&rows));
            }
        }
        Ok(())
    }

    #[test]
    fn test_missing_table_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut db = SqliteDatabase::open_in_memory()?;
        let params = TaskParams::new(Task::Clique, "missing", "src", "dst", 3)?;

        let result = run_task(&mut db, &mut QueryBuilder::new(params));

        assert!(matches!(result, Err(DatabaseError::Sqlite(_))));
        Ok(())
    }
}
