// Persistence layer for the job board: typed repositories over a PostgreSQL store

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod telemetry;

pub use auth::{PasswordHasher, BCRYPT_WORK_FACTOR};
pub use db::repositories::{JobRepository, UserRepository};
pub use db::{DbPool, QueryExecutor};
pub use errors::{DatabaseError, RepositoryError};
