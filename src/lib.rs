//! Named-result SQL query gateway.
//!
//! # Intention
//!
//! - Hold connection credentials and open one connection per query.
//! - Keep each query outcome under a caller-chosen name until it is read once.
//! - Record failures both as structured errors and as a readable error log.
//!
//! # Architectural Boundaries
//!
//! - Only database access code belongs here.
//! - No pooling, parameter binding, transactions or query building.
//! - Drivers plug in behind [`driver::Driver`]; SQLite is the default.

pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod sqlite;
pub mod value;

pub use config::{ConfigError, Credentials};
pub use driver::{Driver, DriverConnection, ResultSet, Row};
pub use error::{DriverError, ErrorKind, GatewayError, GatewayResult};
pub use gateway::QueryGateway;
pub use sqlite::{SqliteConnection, SqliteDriver};
pub use value::Value;
