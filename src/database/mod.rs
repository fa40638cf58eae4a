pub mod postgres_database;
pub mod sqlite_database;
pub mod ssh_tunnel;

use itertools::Itertools;
use log::{info, warn};
use thiserror::Error;

use crate::config::{ConnectionConfig, DatabaseConfig};
use crate::query_builder::{templates::OUTPUT_TABLE_NAME, QueryBuilder};
pub use postgres_database::PostgresDatabase;
pub use sqlite_database::SqliteDatabase;
pub use ssh_tunnel::{SshTunnel, TunnelError};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database error: {0}")]
    Postgres(#[from] postgres::Error),
    #[error("Column {column} of '{query}' is not an integer")]
    NotAnInteger { query: String, column: usize },
}

/// A connection the generated queries run on.
pub trait Database {
    /// Runs `sql`, possibly several statements, and commits.
    fn execute_batch(&mut self, sql: &str) -> Result<(), DatabaseError>;

    /// Runs a query whose columns are all integers.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<i64>>, DatabaseError>;
}

/// Opens the configured database, through an SSH tunnel when one is configured.
///
/// A tunnel that can not be set up is skipped and the database is contacted
/// directly.
pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn Database>, DatabaseError> {
    match &config.database {
        DatabaseConfig::Sqlite { path } => {
            info!("Opening SQLite database {}", path.display());
            Ok(Box::new(SqliteDatabase::open(path)?))
        }
        DatabaseConfig::Postgres { host, port, .. } => {
            let tunnel = config.ssh.as_ref().map(SshTunnel::open);
            let (tunnel, host, port) = database_endpoint(tunnel, host, *port);
            info!("Connecting to {}:{}", host, port);
            Ok(Box::new(PostgresDatabase::connect(
                &config.database,
                &host,
                port,
                tunnel,
            )?))
        }
    }
}

/// Address the database is reached on: the tunnel's local end when it opened,
/// the configured host otherwise.
fn database_endpoint(
    tunnel: Option<Result<SshTunnel, TunnelError>>,
    host: &str,
    port: u16,
) -> (Option<SshTunnel>, String, u16) {
    match tunnel {
        Some(Ok(tunnel)) => {
            let (local_host, local_port) = (tunnel.local_host().to_string(), tunnel.local_port());
            (Some(tunnel), local_host, local_port)
        }
        Some(Err(e)) => {
            warn!(
                "Could not create SSH tunnel: {}. Continuing without tunnelling...",
                e
            );
            (None, host.to_string(), port)
        }
        None => (None, host.to_string(), port),
    }
}

/// Materializes the task's query into the output table and returns its name.
pub fn run_task(
    db: &mut dyn Database,
    builder: &mut QueryBuilder,
) -> Result<&'static str, DatabaseError> {
    let query = builder.build_task();
    let params = builder.get_params();
    info!(
        "Creating table {} for {} on {}",
        OUTPUT_TABLE_NAME, params.task, params.table
    );
    db.execute_batch(&query)?;
    Ok(OUTPUT_TABLE_NAME)
}

/// Reads back the rows of the output table in a stable order.
pub fn read_output(db: &mut dyn Database, column_count: usize) -> Result<Vec<Vec<i64>>, DatabaseError> {
    let columns = (1..=column_count).join(", ");
    db.query_rows(&format!(
        "SELECT * FROM {} ORDER BY {}",
        OUTPUT_TABLE_NAME, columns
    ))
}

/// Reads the edge list `(source, destination)` of `table`.
pub fn read_edges(
    db: &mut dyn Database,
    table: &str,
    source: &str,
    destination: &str,
) -> Result<Vec<(i64, i64)>, DatabaseError> {
    let rows = db.query_rows(&format!(
        "SELECT {}, {} FROM {}",
        source, destination, table
    ))?;
    Ok(rows.into_iter().map(|row| (row[0], row[1])).collect())
}
