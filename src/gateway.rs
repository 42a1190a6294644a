use crate::config::Credentials;
use crate::driver::{Driver, DriverConnection, ResultSet, Row};
use crate::error::{ErrorKind, GatewayError, GatewayResult};
use crate::sqlite::SqliteDriver;
use crate::value::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Runs SQL on a fresh connection per call and keeps each outcome under a
/// caller-chosen name until it is read once.
///
/// Failures are returned as [`GatewayError`] and also appended to a
/// human-readable error log (see [`QueryGateway::errors`]).
///
/// Statements are executed as given. Nothing is bound or escaped, so any
/// value interpolated into `sql` must already be safe.
#[derive(Debug)]
pub struct QueryGateway<D: Driver = SqliteDriver> {
    credentials: Credentials,
    driver: D,
    pending: HashMap<String, ResultSet>,
    errors: Vec<String>,
}

impl QueryGateway<SqliteDriver> {
    /// Capture credentials for a SQLite gateway. No I/O happens here.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self::from_credentials(Credentials::new(host, user, pass, dbname))
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Self::with_driver(credentials, SqliteDriver::new())
    }
}

impl<D: Driver> QueryGateway<D> {
    pub fn with_driver(credentials: Credentials, driver: D) -> Self {
        Self {
            credentials,
            driver,
            pending: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Every error recorded so far, oldest first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Drain the error log.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_pending(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    pub fn pending_names(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    /// Open a connection and select the configured database.
    ///
    /// If the database cannot be selected the session is closed before the
    /// error is returned.
    pub fn connect(&mut self) -> GatewayResult<D::Connection> {
        let host = self.credentials.host().to_string();
        let database = self.credentials.database().to_string();
        debug!(host = %host, database = %database, "connecting");

        let mut connection = match self.driver.connect(&self.credentials) {
            Ok(connection) => connection,
            Err(e) => {
                return Err(self.record(GatewayError::Connection {
                    host,
                    message: e.to_string(),
                }))
            }
        };

        if let Err(e) = connection.select_database(&database) {
            if let Err(close_err) = connection.close() {
                warn!(error = %close_err, "failed to close connection after database selection error");
            }
            return Err(self.record(GatewayError::DatabaseSelection {
                name: database,
                message: e.to_string(),
            }));
        }

        Ok(connection)
    }

    /// Execute `sql` and keep its outcome under `name`, replacing any
    /// unread outcome already stored there.
    pub fn query(&mut self, name: &str, sql: &str) -> GatewayResult<&mut Self> {
        let mut connection = self.connect()?;
        debug!(name, "executing statement");

        let outcome = connection.execute(sql);
        let closed = connection.close();

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "failed to close connection after statement error");
                }
                return Err(self.record(GatewayError::Statement {
                    message: e.to_string(),
                }));
            }
        };
        if let Err(close_err) = closed {
            warn!(name, error = %close_err, "failed to close connection");
        }

        info!(name, rows = result.len(), "stored pending result");
        self.pending.insert(name.to_string(), result);
        Ok(self)
    }

    /// Take the stored outcome for `name`, if there is one.
    pub fn result(&mut self, name: &str) -> Option<ResultSet> {
        self.pending.remove(name)
    }

    /// All rows stored under `name`, keyed by column name.
    ///
    /// A statement that returned no rows yields an empty vector; a name with
    /// nothing pending is an [`GatewayError::UnknownResult`].
    pub fn result_as_rows(&mut self, name: &str) -> GatewayResult<Vec<Row>> {
        Ok(self.take_pending(name)?.into_rows())
    }

    /// The first row stored under `name`, by column position. Any further
    /// rows are discarded along with the entry.
    pub fn result_as_single_row(&mut self, name: &str) -> GatewayResult<Option<Vec<Value>>> {
        Ok(self.take_pending(name)?.into_first_row())
    }

    /// Append a catalog message to the error log.
    ///
    /// `kind` is a catalog key such as `"DB_ERR"`. Each `(token, value)` pair
    /// replaces `%token` in the message template.
    pub fn error(&mut self, kind: &str, substitutions: &[(&str, &str)]) -> GatewayResult<&mut Self> {
        let kind: ErrorKind = kind.parse()?;
        self.push_error(kind.render(substitutions));
        Ok(self)
    }

    /// Log `error` through the catalog and hand it back.
    pub fn record(&mut self, error: GatewayError) -> GatewayError {
        if let Some(line) = error.render() {
            self.push_error(line);
        }
        error
    }

    fn take_pending(&mut self, name: &str) -> GatewayResult<ResultSet> {
        match self.pending.remove(name) {
            Some(result) => Ok(result),
            None => Err(self.record(GatewayError::UnknownResult {
                name: name.to_string(),
            })),
        }
    }

    fn push_error(&mut self, line: String) {
        warn!("{line}");
        self.errors.push(line);
    }
}
