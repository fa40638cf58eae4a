mod app;
mod logging;
mod validate;

use app::build_cli;
use clap::ArgMatches;
use graphsql_lib::*;
use log::info;
use std::{path::Path, process};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = build_cli().get_matches();

    let log_file = matches.value_of("log_file").unwrap_or(app::DEFAULT_LOG_PATH);
    if let Err(e) = logging::init_logging(log_file) {
        eprintln!("Could not open log file {}: {}", log_file, e);
    }

    let params = match matches.value_of("task").map(str::parse::<TaskParams>) {
        Some(Ok(params)) => params,
        Some(Err(e)) => usage_error(&e.to_string()),
        None => usage_error("missing task"),
    };

    run(&matches, params)
}

fn run(matches: &ArgMatches, params: TaskParams) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = QueryBuilder::new(params.clone());
    if !matches.is_present("no_save") {
        builder = builder.save_to(
            matches
                .value_of("save_query")
                .unwrap_or(app::DEFAULT_QUERY_PATH),
        );
    }

    if matches.is_present("dry_run") {
        println!("{}", builder.build_task());
        return Ok(());
    }

    let config_path = matches
        .value_of("config")
        .unwrap_or(config::DEFAULT_CONFIG_PATH);
    let config = ConnectionConfig::read(Path::new(config_path))?;
    let mut db = connect(&config)?;

    let table = run_task(db.as_mut(), &mut builder)?;
    info!("Materialized {} into {}", params.task, table);
    println!("{}", table);

    if matches.is_present("validate") && !validate::validate(db.as_mut(), &params)? {
        process::exit(1);
    }

    Ok(())
}

fn usage_error(message: &str) -> ! {
    println!("Invalid arguments: {}", message);
    println!("{}", USAGE);
    process::exit(1);
}
