// Password hashing and verification
// bcrypt with a fixed work factor; the blocking work runs off the async executor

use crate::config::AuthConfig;
use crate::errors::RepositoryError;
use std::sync::Arc;
use tracing::instrument;

/// Work factor used for every stored password unless configured otherwise
pub const BCRYPT_WORK_FACTOR: u32 = 12;

const DUMMY_PASSWORD: &str = "jobly-dummy-password";

/// One-way password hashing service
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hashed at the same cost as real passwords, so verifying against it
    /// takes as long as verifying a stored hash
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4..=31).
    ///
    /// Computes the dummy hash up front, so construction costs one bcrypt hash.
    ///
    /// # Errors
    /// `RepositoryError::PasswordHash` if bcrypt rejects the cost
    pub fn new(cost: u32) -> Result<Self, RepositoryError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)?;
        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Create a hasher using the configured work factor
    pub fn from_config(config: &AuthConfig) -> Result<Self, RepositoryError> {
        Self::new(config.bcrypt_cost)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password
    #[instrument(skip(self, password), fields(cost = self.cost))]
    pub async fn hash(&self, password: &str) -> Result<String, RepositoryError> {
        let password = password.to_string();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| RepositoryError::PasswordHash(e.to_string()))??;
        Ok(hash)
    }

    /// Check a plaintext password against a stored hash
    #[instrument(skip_all)]
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, RepositoryError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| RepositoryError::PasswordHash(e.to_string()))??;
        Ok(valid)
    }

    /// Verify against `hash`, or against the dummy hash when there is none.
    ///
    /// Both the unknown-user and wrong-password paths then pay for exactly one
    /// bcrypt verification. Returns `false` whenever `hash` is `None`.
    #[instrument(skip_all)]
    pub async fn verify_or_dummy(
        &self,
        password: &str,
        hash: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        match hash {
            Some(hash) => self.verify(password, hash).await,
            None => {
                self.verify(password, &self.dummy_hash).await?;
                Ok(false)
            }
        }
    }
}
