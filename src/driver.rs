//! The seam between the gateway and a native database client.

use crate::config::Credentials;
use crate::error::DriverError;
use crate::value::Value;
use std::collections::HashMap;

/// One row as column name to value.
pub type Row = HashMap<String, Value>;

/// Everything a statement produced, drained from the driver's cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows changed by a statement that returns no rows.
    pub rows_affected: u64,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows keyed by column name. Later duplicate column names overwrite
    /// earlier ones, as with an associative fetch.
    pub fn into_rows(self) -> Vec<Row> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect()
    }

    /// The first row by position; the rest are dropped.
    pub fn into_first_row(self) -> Option<Vec<Value>> {
        self.rows.into_iter().next()
    }
}

/// Opens sessions against a database server.
pub trait Driver {
    type Connection: DriverConnection;

    fn connect(&self, credentials: &Credentials) -> Result<Self::Connection, DriverError>;
}

/// An open session.
pub trait DriverConnection {
    fn select_database(&mut self, name: &str) -> Result<(), DriverError>;

    /// Runs `sql` and buffers its whole outcome.
    fn execute(&mut self, sql: &str) -> Result<ResultSet, DriverError>;

    fn close(self) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> ResultSet {
        ResultSet {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec![Value::Integer(1), Value::from("alice")],
                vec![Value::Integer(2), Value::from("bob")],
            ],
            rows_affected: 0,
        }
    }

    #[test]
    fn test_into_rows() {
        let rows = users().into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], Value::Integer(1));
        assert_eq!(rows[1]["name"], Value::from("bob"));
    }

    #[test]
    fn test_into_first_row() {
        assert_eq!(
            users().into_first_row(),
            Some(vec![Value::Integer(1), Value::from("alice")])
        );
        assert_eq!(ResultSet::new(vec!["id".to_string()]).into_first_row(), None);
    }

    #[test]
    fn test_duplicate_columns_keep_last() {
        let set = ResultSet {
            columns: vec!["v".to_string(), "v".to_string()],
            rows: vec![vec![Value::Integer(1), Value::Integer(2)]],
            rows_affected: 0,
        };
        let rows = set.into_rows();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0]["v"], Value::Integer(2));
    }
}
