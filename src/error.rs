//! Error types and the message catalog behind the gateway's error log.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures surfaced by the gateway.
///
/// Every variant except [`GatewayError::UnknownErrorKind`] maps onto a
/// catalog entry, so the same failure can be rendered into the string log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("unable to connect to {host}: {message}")]
    Connection { host: String, message: String },

    #[error("database {name} is not available: {message}")]
    DatabaseSelection { name: String, message: String },

    #[error("statement failed: {message}")]
    Statement { message: String },

    #[error("no pending result named {name}")]
    UnknownResult { name: String },

    #[error("unknown error kind: {0}")]
    UnknownErrorKind(String),
}

impl GatewayError {
    /// Catalog entry used to render this error into the log.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayError::Connection { .. } => Some(ErrorKind::Connection),
            GatewayError::DatabaseSelection { .. } => Some(ErrorKind::Database),
            GatewayError::Statement { .. } => Some(ErrorKind::Sql),
            GatewayError::UnknownResult { .. } => Some(ErrorKind::Result),
            GatewayError::UnknownErrorKind(_) => None,
        }
    }

    /// Token values fed into the catalog template.
    pub fn substitutions(&self) -> Vec<(&'static str, &str)> {
        match self {
            GatewayError::Connection { .. } | GatewayError::UnknownErrorKind(_) => Vec::new(),
            GatewayError::DatabaseSelection { name, .. } => vec![("dbnm", name.as_str())],
            GatewayError::Statement { message } => vec![("error", message.as_str())],
            GatewayError::UnknownResult { name } => vec![("name", name.as_str())],
        }
    }

    /// The log line for this error, if it has a catalog entry.
    pub fn render(&self) -> Option<String> {
        self.kind()
            .map(|kind| kind.render(&self.substitutions()))
    }
}

/// Error reported by a database driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<rusqlite::Error> for DriverError {
    fn from(value: rusqlite::Error) -> Self {
        DriverError(value.to_string())
    }
}

/// The fixed table of error kinds known to the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `CONN_ERR`
    Connection,
    /// `DB_ERR`
    Database,
    /// `SQL_ERR`
    Sql,
    /// `RESULT_ERR`
    Result,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::Connection,
        ErrorKind::Database,
        ErrorKind::Sql,
        ErrorKind::Result,
    ];

    /// Catalog key, as accepted by [`crate::QueryGateway::error`].
    pub fn key(self) -> &'static str {
        match self {
            ErrorKind::Connection => "CONN_ERR",
            ErrorKind::Database => "DB_ERR",
            ErrorKind::Sql => "SQL_ERR",
            ErrorKind::Result => "RESULT_ERR",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::Connection => "Connection Error",
            ErrorKind::Database => "Database Error",
            ErrorKind::Sql => "SQL Error",
            ErrorKind::Result => "Result Error",
        }
    }

    /// Message template. `%token` placeholders are filled by [`ErrorKind::render`].
    pub fn template(self) -> &'static str {
        match self {
            ErrorKind::Connection => {
                "Unable to connect to the database server! Check your username and password!"
            }
            ErrorKind::Database => {
                "Database \"%dbnm\" not found on this server. It has been dropped or renamed!"
            }
            ErrorKind::Sql => "%error",
            ErrorKind::Result => {
                "No pending result named \"%name\". It was never queried or has already been read!"
            }
        }
    }

    /// Formats `"Title: message"`, replacing each `%token` in the template
    /// with its value. Tokens without a value are left as written, and
    /// inserted values are never scanned for further tokens.
    pub fn render(self, substitutions: &[(&str, &str)]) -> String {
        // Longer tokens first so `%db` never eats into `%dbnm`.
        let mut ordered: Vec<_> = substitutions
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut message = String::new();
        let mut rest = self.template();
        while let Some(pos) = rest.find('%') {
            message.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            match ordered.iter().find(|(token, _)| after.starts_with(token)) {
                Some((token, value)) => {
                    message.push_str(value);
                    rest = &after[token.len()..];
                }
                None => {
                    message.push('%');
                    rest = after;
                }
            }
        }
        message.push_str(rest);
        format!("{}: {}", self.title(), message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ErrorKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| GatewayError::UnknownErrorKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_tokens() {
        let line = ErrorKind::Database.render(&[("dbnm", "shop")]);
        assert_eq!(
            line,
            "Database Error: Database \"shop\" not found on this server. It has been dropped or renamed!"
        );
        assert!(!line.contains("%dbnm"));
    }

    #[test]
    fn test_render_without_substitutions_uses_template() {
        assert_eq!(
            ErrorKind::Sql.render(&[]),
            "SQL Error: %error"
        );
        assert!(ErrorKind::Connection
            .render(&[])
            .starts_with("Connection Error: Unable to connect"));
    }

    #[test]
    fn test_render_ignores_unused_tokens() {
        let line = ErrorKind::Sql.render(&[("error", "near \"SELEC\": syntax error"), ("dbnm", "x")]);
        assert_eq!(line, "SQL Error: near \"SELEC\": syntax error");
    }

    #[test]
    fn test_longer_token_wins() {
        let line = ErrorKind::Database.render(&[("db", "WRONG"), ("dbnm", "shop")]);
        assert!(line.contains("\"shop\""));
        assert!(!line.contains("WRONG"));
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let line = ErrorKind::Database.render(&[("dbnm", "50%db"), ("db", "X")]);
        assert!(line.contains("\"50%db\""));
        assert!(!line.contains("50X"));

        let line = ErrorKind::Sql.render(&[("error", "100% %error")]);
        assert_eq!(line, "SQL Error: 100% %error");
    }

    #[test]
    fn test_kind_from_key() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.key().parse::<ErrorKind>().unwrap(), kind);
        }
        assert_eq!(
            "NOPE".parse::<ErrorKind>(),
            Err(GatewayError::UnknownErrorKind("NOPE".to_string()))
        );
    }

    #[test]
    fn test_gateway_error_render() {
        let err = GatewayError::DatabaseSelection {
            name: "shop".to_string(),
            message: "unable to open database file".to_string(),
        };
        assert_eq!(err.kind(), Some(ErrorKind::Database));
        assert!(err.render().unwrap().contains("\"shop\""));

        let err = GatewayError::Statement {
            message: "no such table: nope".to_string(),
        };
        assert_eq!(err.render().unwrap(), "SQL Error: no such table: nope");

        assert_eq!(GatewayError::UnknownErrorKind("X".to_string()).render(), None);
    }
}
