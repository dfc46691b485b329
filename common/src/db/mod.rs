// Database layer module
// Connection pool, query executor seam, clause builders, and repositories

pub mod executor;
pub mod pool;
pub mod repositories;
pub mod sql;

pub use executor::{QueryExecutor, Row, SqlValue};
pub use pool::DbPool;
pub use sql::{ColumnMap, FilterClause, SetClause, SqlParams};
