use thiserror::Error;

use crate::auth::PasswordHasher;
use crate::config::AdminCredentials;
use crate::repositories::{RepositoryError, UserRepository};
use crate::utils::error::AppError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("ADMIN_USERNAME and ADMIN_PASSWORD must be set when no administrator exists")]
    MissingCredentials,

    #[error("failed to hash admin password: {0}")]
    Hashing(#[from] AppError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSeed {
    Created,
    AlreadyPresent,
}

/// Creates the initial administrator unless one already exists.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    credentials: Option<&AdminCredentials>,
) -> Result<AdminSeed, SeedError> {
    if users.count_admins().await? > 0 {
        tracing::info!("Admin user already exists");
        return Ok(AdminSeed::AlreadyPresent);
    }

    let credentials = credentials.ok_or(SeedError::MissingCredentials)?;
    let password_hash = hasher.hash(&credentials.password).await?;
    let admin = users
        .create(&credentials.username, &password_hash, true)
        .await?;

    tracing::info!(user_id = admin.id, username = %admin.username, "Admin user created");
    Ok(AdminSeed::Created)
}
