// User repository implementation
// Registration, credential checks, profile reads and updates, job applications

use super::first_row;
use super::queries::user_queries;
use crate::auth::PasswordHasher;
use crate::db::executor::{from_row, QueryExecutor, SqlValue};
use crate::db::sql::{ColumnMap, SetClause, SqlParams};
use crate::db::DbPool;
use crate::errors::{DatabaseError, RepositoryError};
use crate::models::{NewUser, User, UserDetail, UserUpdate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Update keys whose column name differs from the key
const USER_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

/// Stored hash alongside the public fields; only used inside `authenticate`
#[derive(Deserialize)]
struct UserCredentials {
    password: String,
    #[serde(flatten)]
    user: User,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationRow {
    job_id: i32,
}

/// Repository for user-related database operations
#[derive(Clone)]
pub struct UserRepository {
    executor: Arc<dyn QueryExecutor>,
    hasher: PasswordHasher,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(executor: Arc<dyn QueryExecutor>, hasher: PasswordHasher) -> Self {
        Self { executor, hasher }
    }

    /// Create a UserRepository backed by the PostgreSQL pool
    pub fn from_pool(pool: DbPool, hasher: PasswordHasher) -> Self {
        Self::new(Arc::new(pool), hasher)
    }

    /// Register a user, storing only the bcrypt hash of their password
    ///
    /// # Errors
    /// `RepositoryError::Duplicate` if the username is taken
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: NewUser) -> Result<User, RepositoryError> {
        let password_hash = self.hasher.hash(&user.password).await?;

        let mut params = SqlParams::new();
        let values = [
            params.push(user.username.as_str()),
            params.push(user.first_name),
            params.push(user.last_name),
            params.push(password_hash),
            params.push(user.email),
            params.push(user.is_admin),
        ]
        .join(", ");

        let sql = format!(
            "INSERT INTO users (username, first_name, last_name, password, email, is_admin)
             VALUES ({})
             RETURNING {}",
            values,
            user_queries::PUBLIC_COLUMNS
        );

        let rows = self
            .executor
            .query(&sql, params.into_values())
            .await
            .map_err(|e| match e {
                e @ DatabaseError::DuplicateKey(_) => RepositoryError::Duplicate {
                    field: "username",
                    value: user.username.clone(),
                    source: e,
                },
                other => other.into(),
            })?;

        let row = first_row(rows)
            .ok_or_else(|| DatabaseError::QueryFailed("INSERT returned no row".to_string()))?;
        let created: User = from_row(row)?;

        tracing::info!(username = %created.username, "User registered");
        Ok(created)
    }

    /// Check a username/password pair and return the user on success.
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// `RepositoryError::InvalidCredentials`, and both run one bcrypt verification.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, RepositoryError> {
        let sql = format!(
            "SELECT password, {} FROM users WHERE username = $1",
            user_queries::PUBLIC_COLUMNS
        );
        let rows = self.executor.query(&sql, vec![SqlValue::from(username)]).await?;
        let credentials: Option<UserCredentials> = first_row(rows).map(from_row).transpose()?;

        let stored_hash = credentials.as_ref().map(|c| c.password.as_str());
        let valid = match self.hasher.verify_or_dummy(password, stored_hash).await {
            Ok(valid) => valid,
            // An unreadable stored hash can never verify
            Err(RepositoryError::PasswordHash(reason)) if credentials.is_some() => {
                tracing::warn!(
                    username = %username,
                    error = %reason,
                    "Stored password hash is unusable"
                );
                false
            }
            Err(e) => return Err(e),
        };

        match credentials {
            Some(credentials) if valid => {
                tracing::info!(username = %username, "User authenticated");
                Ok(credentials.user)
            }
            _ => {
                tracing::debug!(username = %username, "Authentication rejected");
                Err(RepositoryError::InvalidCredentials)
            }
        }
    }

    /// List all users, ordered by username
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY username",
            user_queries::PUBLIC_COLUMNS
        );
        let rows = self.executor.query(&sql, Vec::new()).await?;
        let users = rows
            .into_iter()
            .map(from_row)
            .collect::<Result<Vec<User>, _>>()?;

        Ok(users)
    }

    /// Get a user and the ids of the jobs they applied to
    #[instrument(skip(self))]
    pub async fn get(&self, username: &str) -> Result<UserDetail, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = $1",
            user_queries::PUBLIC_COLUMNS
        );
        let rows = self.executor.query(&sql, vec![SqlValue::from(username)]).await?;
        let user: User = match first_row(rows) {
            Some(row) => from_row(row)?,
            None => return Err(RepositoryError::not_found("user", username)),
        };

        let rows = self
            .executor
            .query(
                r#"SELECT job_id AS "jobId" FROM applications WHERE username = $1 ORDER BY job_id"#,
                vec![SqlValue::from(username)],
            )
            .await?;
        let applications = rows
            .into_iter()
            .map(|row| from_row::<ApplicationRow>(row).map(|a| a.job_id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserDetail { user, applications })
    }

    /// Apply a partial update to a user. A new password is hashed before storing.
    ///
    /// # Errors
    /// - `RepositoryError::EmptyUpdate` if `data` sets no field; nothing is sent to the store
    /// - `RepositoryError::NotFound` if no user has this username
    #[instrument(skip(self, data))]
    pub async fn update(&self, username: &str, data: UserUpdate) -> Result<User, RepositoryError> {
        let password_hash = match &data.password {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };

        let (set_sql, mut params) =
            SetClause::compose(data.into_changes(password_hash), USER_COLUMNS)?.into_parts();
        let username_placeholder = params.push(username);

        let sql = format!(
            "UPDATE users
             SET {}
             WHERE username = {}
             RETURNING {}",
            set_sql,
            username_placeholder,
            user_queries::PUBLIC_COLUMNS
        );

        let rows = self.executor.query(&sql, params.into_values()).await?;
        let user: User = match first_row(rows) {
            Some(row) => from_row(row)?,
            None => return Err(RepositoryError::not_found("user", username)),
        };

        tracing::info!(username = %user.username, "User updated");
        Ok(user)
    }

    /// Delete a user
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if the delete matched no row
    #[instrument(skip(self))]
    pub async fn remove(&self, username: &str) -> Result<(), RepositoryError> {
        let rows = self
            .executor
            .query(
                "DELETE FROM users WHERE username = $1 RETURNING username",
                vec![SqlValue::from(username)],
            )
            .await?;

        if rows.is_empty() {
            return Err(RepositoryError::not_found("user", username));
        }

        tracing::info!(username = %username, "User deleted");
        Ok(())
    }

    /// Record that a user applied to a job
    ///
    /// # Errors
    /// - `RepositoryError::NotFound` for an unknown job or user
    /// - `RepositoryError::Duplicate` if the user already applied to this job
    #[instrument(skip(self))]
    pub async fn apply_to_job(&self, username: &str, job_id: i32) -> Result<(), RepositoryError> {
        let rows = self
            .executor
            .query(
                "INSERT INTO applications (job_id, username)
                 SELECT j.id, u.username
                 FROM jobs j, users u
                 WHERE j.id = $1 AND u.username = $2
                 RETURNING job_id",
                vec![SqlValue::from(job_id), SqlValue::from(username)],
            )
            .await
            .map_err(|e| match e {
                e @ DatabaseError::DuplicateKey(_) => RepositoryError::Duplicate {
                    field: "application",
                    value: format!("{} -> {}", username, job_id),
                    source: e,
                },
                other => other.into(),
            })?;

        if rows.is_empty() {
            return Err(self.missing_application_target(username, job_id).await);
        }

        tracing::info!(username = %username, job_id = job_id, "Application recorded");
        Ok(())
    }

    /// Work out which side of a failed application does not exist
    async fn missing_application_target(&self, username: &str, job_id: i32) -> RepositoryError {
        let job = self
            .executor
            .query("SELECT id FROM jobs WHERE id = $1", vec![SqlValue::from(job_id)])
            .await;

        match job {
            Ok(rows) if rows.is_empty() => RepositoryError::not_found("job", job_id),
            Ok(_) => RepositoryError::not_found("user", username),
            Err(e) => e.into(),
        }
    }
}
