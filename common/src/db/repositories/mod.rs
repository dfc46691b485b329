// Repository layer for database operations

pub mod job;
pub mod queries;
pub mod user;

pub use job::JobRepository;
pub use user::UserRepository;

use crate::db::executor::Row;

/// First row of a result set, if any
pub(crate) fn first_row(rows: Vec<Row>) -> Option<Row> {
    rows.into_iter().next()
}
