use super::{Database, DatabaseError};
use rusqlite::Connection;
use std::path::Path;

pub struct SqliteDatabase {
    db: Connection,
}

impl SqliteDatabase {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            db: Connection::open_in_memory()?,
        })
    }

    /// Creates `table(source, destination)` holding `edges`.
    pub fn create_edge_table(
        &mut self,
        table: &str,
        source: &str,
        destination: &str,
        edges: &[(i64, i64)],
    ) -> Result<(), DatabaseError> {
        let tx = self.db.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} ({source} INTEGER NOT NULL, {destination} INTEGER NOT NULL);",
            table = table,
            source = source,
            destination = destination,
        ))?;
        {
            let mut insert = tx.prepare(&format!(
                "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
                table, source, destination
            ))?;
            for (s, d) in edges {
                insert.execute([s, d])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl Database for SqliteDatabase {
    fn execute_batch(&mut self, sql: &str) -> Result<(), DatabaseError> {
        let tx = self.db.transaction()?;
        tx.execute_batch(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<i64>>, DatabaseError> {
        let mut statement = self.db.prepare(sql)?;
        let column_count = statement.column_count();
        let rows = statement.query_map([], |row| {
            (0..column_count)
                .map(|i| row.get::<_, i64>(i))
                .collect::<rusqlite::Result<Vec<i64>>>()
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_connection_in_memory() -> Result<(), Box<dyn std::error::Error>> {
        let mut db = SqliteDatabase::open_in_memory()?;
        db.create_edge_table("edges", "src", "dst", &[(1, 2), (2, 3)])?;

        let rows = db.query_rows("SELECT src, dst FROM edges ORDER BY src")?;
        assert_eq!(rows, vec![vec![1, 2], vec![2, 3]]);

        db.execute_batch("CREATE TABLE copy AS SELECT dst FROM edges; DELETE FROM copy WHERE dst = 3;")?;
        assert_eq!(db.query_rows("SELECT * FROM copy")?, vec![vec![2]]);
        Ok(())
    }

    #[test]
    fn test_failed_batch_is_rolled_back() -> Result<(), Box<dyn std::error::Error>> {
        let mut db = SqliteDatabase::open_in_memory()?;
        db.create_edge_table("edges", "src", "dst", &[(1, 2)])?;

        let result = db.execute_batch("DELETE FROM edges; SELECT * FROM missing_table;");
        assert!(matches!(result, Err(DatabaseError::Sqlite(_))));
        assert_eq!(db.query_rows("SELECT COUNT(*) FROM edges")?, vec![vec![1]]);
        Ok(())
    }

    #[test]
    fn test_non_integer_column_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut db = SqliteDatabase::open_in_memory()?;
        assert!(db.query_rows("SELECT 'a'").is_err());
        Ok(())
    }

    #[test]
    fn test_open_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("graph.db");
        {
            let mut db = SqliteDatabase::open(&path)?;
            db.create_edge_table("edges", "src", "dst", &[(4, 5)])?;
        }
        let mut db = SqliteDatabase::open(&path)?;
        assert_eq!(db.query_rows("SELECT * FROM edges")?, vec![vec![4, 5]]);
        Ok(())
    }
}
