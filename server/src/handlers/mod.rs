use axum::extract::{FromRequest, FromRequestParts};
use axum::response::Response;
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::ok;

pub mod auth;
pub mod events;
pub mod user_events;

pub use auth::{login, promote_user, register};
pub use events::{create_event, delete_event, get_event, list_events, update_event};
pub use user_events::{list_user_events, sign_up_for_event};

/// JSON body extractor whose rejection is rendered as a validation error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query-string extractor; duplicate or malformed keys become validation errors.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventboard-api",
    };

    ok(payload)
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::ValidationError("Invalid ID".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(AppError::ValidationError(_))));
    }
}
