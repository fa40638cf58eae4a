use super::{Database, DatabaseError, SshTunnel};
use crate::config::DatabaseConfig;
use postgres::{Client, NoTls, Row};

/// Connection to a server speaking the PostgreSQL wire protocol.
pub struct PostgresDatabase {
    client: Client,
    // Dropped after the client, which keeps the forwarded port open until then.
    _tunnel: Option<SshTunnel>,
}

impl PostgresDatabase {
    /// Connects to `host:port` with the credentials of `config`.
    ///
    /// `host` and `port` may differ from the configured ones when a tunnel is
    /// used.
    pub fn connect(
        config: &DatabaseConfig,
        host: &str,
        port: u16,
        tunnel: Option<SshTunnel>,
    ) -> Result<Self, DatabaseError> {
        let mut pg_config = postgres::Config::new();
        pg_config.host(host).port(port);
        if let DatabaseConfig::Postgres {
            user,
            password,
            database,
            ..
        } = config
        {
            pg_config.user(user).dbname(database);
            if !password.is_empty() {
                pg_config.password(password);
            }
        }

        Self::open(&pg_config, tunnel)
    }

    /// Connects with a ready `postgres::Config`, e.g. parsed from
    /// `host=localhost user=postgres dbname=graphs`.
    pub fn open(pg_config: &postgres::Config, tunnel: Option<SshTunnel>) -> Result<Self, DatabaseError> {
        let client = pg_config.connect(NoTls)?;
        Ok(Self {
            client,
            _tunnel: tunnel,
        })
    }
}

impl Database for PostgresDatabase {
    fn execute_batch(&mut self, sql: &str) -> Result<(), DatabaseError> {
        let mut transaction = self.client.transaction()?;
        transaction.batch_execute(sql)?;
        transaction.commit()?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<i64>>, DatabaseError> {
        self.client
            .query(sql, &[])?
            .iter()
            .map(|row| integer_row(sql, row))
            .collect()
    }
}

/// Reads every column of `row` as an integer, whatever its width.
fn integer_row(sql: &str, row: &Row) -> Result<Vec<i64>, DatabaseError> {
    (0..row.len())
        .map(|i| {
            row.try_get::<_, i64>(i)
                .or_else(|_| row.try_get::<_, i32>(i).map(i64::from))
                .or_else(|_| row.try_get::<_, i16>(i).map(i64::from))
                .map_err(|_| DatabaseError::NotAnInteger {
                    query: sql.to_string(),
                    column: i,
                })
        })
        .collect()
}
