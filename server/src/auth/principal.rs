use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::Claims;
use crate::utils::error::AppError;

/// Authenticated caller, placed in request extensions by [`super::require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::AuthError("Missing or invalid token".to_string()))
    }
}

/// A [`Principal`] that is known to be an administrator.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_admin {
            tracing::warn!(user_id = principal.user_id, "Admin route denied");
            return Err(AppError::Forbidden("Access denied".to_string()));
        }
        Ok(AdminPrincipal(principal))
    }
}
