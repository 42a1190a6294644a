use crate::config::Credentials;
use crate::driver::{Driver, DriverConnection, ResultSet};
use crate::error::DriverError;
use crate::value::Value;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use tracing::debug;

/// SQLite driver. The credential host names the directory holding the
/// database files; username and password are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    fn connect(&self, credentials: &Credentials) -> Result<SqliteConnection, DriverError> {
        let root = PathBuf::from(credentials.host());
        if !root.is_dir() {
            return Err(DriverError::new(format!(
                "host {} is not a reachable database directory",
                root.display()
            )));
        }
        debug!(host = %root.display(), user = credentials.username(), "opening sqlite session");
        // A session starts on a private in-memory database until one is selected.
        let connection = Connection::open_in_memory()?;
        Ok(SqliteConnection {
            root,
            connection,
            selected: None,
        })
    }
}

/// An open SQLite session rooted at a host directory.
#[derive(Debug)]
pub struct SqliteConnection {
    root: PathBuf,
    connection: Connection,
    selected: Option<String>,
}

impl SqliteConnection {
    /// Name of the database chosen with `select_database`, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

impl DriverConnection for SqliteConnection {
    fn select_database(&mut self, name: &str) -> Result<(), DriverError> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(DriverError::new(format!(
                "database file {} does not exist",
                path.display()
            )));
        }
        // No SQLITE_OPEN_CREATE: selecting a database never creates one.
        let connection = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        // Opening is lazy; reading the schema rejects files that are not databases.
        connection.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))?;
        let previous = std::mem::replace(&mut self.connection, connection);
        previous.close().map_err(|(_, e)| DriverError::from(e))?;
        self.selected = Some(name.to_string());
        debug!(database = name, "selected sqlite database");
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<ResultSet, DriverError> {
        let mut result = {
            let mut stmt = self.connection.prepare(sql)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();
            let width = columns.len();
            let mut result = ResultSet::new(columns);
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(Value::from(row.get_ref(i)?));
                }
                result.rows.push(values);
            }
            result
        };
        if result.columns.is_empty() {
            result.rows_affected = self.connection.changes() as u64;
        }
        debug!(
            columns = result.columns.len(),
            rows = result.rows.len(),
            rows_affected = result.rows_affected,
            "executed statement"
        );
        Ok(result)
    }

    fn close(self) -> Result<(), DriverError> {
        self.connection.close().map_err(|(_, e)| DriverError::from(e))
    }
}
