use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;

use super::{parse_id, QueryParams};
use crate::auth::Principal;
use crate::models::Pagination;
use crate::repositories::SignupFilter;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{message, ok};

#[derive(Debug, Default, Deserialize)]
pub struct UserEventsQuery {
    pub filter: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub async fn sign_up_for_event(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_id(&id)?;
    state
        .signups
        .create_signup(principal.user_id, event_id)
        .await?;
    Ok(message("Successfully signed up for the event"))
}

pub async fn list_user_events(
    principal: Principal,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserEventsQuery>,
) -> Result<Response, AppError> {
    let filter: SignupFilter = query
        .filter
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::ValidationError("Invalid filter option".to_string()))?;
    let pagination = Pagination::from_params(query.page.as_deref(), query.limit.as_deref());

    let events = state
        .signups
        .get_all(principal.user_id, filter, pagination.limit, pagination.offset())
        .await?;
    let total = state
        .signups
        .get_total_count(principal.user_id, filter)
        .await?;

    Ok(ok(pagination.wrap(events, total)))
}
