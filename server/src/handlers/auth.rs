use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;

use super::JsonBody;
use crate::auth::AdminPrincipal;
use crate::models::Credentials;
use crate::repositories::RepositoryError;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, message, ok};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Credentials>,
) -> Result<Response, AppError> {
    input.validate_registration()?;

    let password_hash = state.hasher.hash(&input.password).await?;
    let user = state
        .users
        .create(&input.username, &password_hash, false)
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(created(user))
}

/// Unknown users and wrong passwords produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<Credentials>,
) -> Result<Response, AppError> {
    let user = match state.users.get_by_username(&input.username).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound) => {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    if !state
        .hasher
        .verify(&input.password, &user.password_hash)
        .await?
    {
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(&user)?;
    Ok(ok(TokenResponse { token }))
}

pub async fn promote_user(
    AdminPrincipal(admin): AdminPrincipal,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let user = state
        .users
        .get_by_username(&username)
        .await
        .map_err(|e| AppError::from_lookup(e, "User not found"))?;

    if user.is_admin {
        return Err(AppError::ValidationError(
            "User is already an admin".to_string(),
        ));
    }

    state
        .users
        .set_admin(user.id, true)
        .await
        .map_err(|e| AppError::from_lookup(e, "User not found"))?;

    tracing::info!(user_id = user.id, promoted_by = admin.user_id, "User promoted to admin");
    Ok(message("User promoted to admin successfully"))
}
