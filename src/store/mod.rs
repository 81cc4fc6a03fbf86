//! Persistence layer: libSQL-backed storage for every LifeOps row.

pub mod libsql_backend;
mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{ActivityCounts, Database};
