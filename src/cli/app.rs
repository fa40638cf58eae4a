use clap::{App, Arg};
use graphsql_lib::config::DEFAULT_CONFIG_PATH;
use indoc::indoc;

pub const DEFAULT_QUERY_PATH: &str = "pygraph.sql";
pub const DEFAULT_LOG_PATH: &str = "graphsql.log";

pub fn build_cli() -> App<'static, 'static> {
    // Not required here: a missing task is reported with our own usage text.
    let task = Arg::with_name("task")
        .index(1)
        .value_name("TASK")
        .help("Task description, e.g. \"task=clique;table=edges;source=src;destination=dst;k=3\"")
        .long_help(indoc! {"
            Task description as semicolon separated key=value pairs:
                task - clique or diameter.
                table - table holding the edge list.
                source - column of the edge source vertex.
                destination - column of the edge destination vertex.
                k - clique size, or the hop threshold for diameter.
        "});

    let config = Arg::with_name("config")
        .short("c")
        .long("config")
        .value_name("FILE")
        .help("Sets the connection configuration file.")
        .takes_value(true)
        .default_value(DEFAULT_CONFIG_PATH);

    let save_query = Arg::with_name("save_query")
        .short("o")
        .long("save-query")
        .value_name("FILE")
        .help("Writes the generated SQL to this file.")
        .takes_value(true)
        .default_value(DEFAULT_QUERY_PATH);

    let no_save = Arg::with_name("no_save")
        .long("no-save")
        .help("Does not write the generated SQL to a file.");

    let log_file = Arg::with_name("log_file")
        .long("log-file")
        .value_name("FILE")
        .help("Sets the log file. RUST_LOG sets the level, warn by default.")
        .takes_value(true)
        .default_value(DEFAULT_LOG_PATH);

    let dry_run = Arg::with_name("dry_run")
        .long("dry-run")
        .help("Prints the generated SQL instead of running it.");

    let validate = Arg::with_name("validate")
        .long("validate")
        .help("Checks the result against an in-memory computation.")
        .conflicts_with("dry_run");

    App::new("graphsql")
        .version("0.2.0")
        .about("Computes graph properties of an edge table with recursive SQL.")
        .long_about(indoc! {"
            Computes graph properties of an edge table with recursive SQL.

            The generated query is run on the database of the configuration file and
            its result is stored in the table cs44_graphsql_output."})
        .args(&[task, config, save_query, no_save, log_file, dry_run, validate])
}
