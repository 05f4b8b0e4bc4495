use bcrypt::{hash, verify, DEFAULT_COST};
use tokio::task;

use crate::utils::error::AppError;

/// bcrypt hashing run on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.cost;

        task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::InternalServerError(format!("hash task failed: {e}")))?
            .map_err(|e| AppError::InternalServerError(format!("failed to hash password: {e}")))
    }

    /// A malformed stored hash verifies as `false`.
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        let outcome = task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::InternalServerError(format!("verify task failed: {e}")))?;

        match outcome {
            Ok(matched) => Ok(matched),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be verified");
                Ok(false)
            }
        }
    }
}
