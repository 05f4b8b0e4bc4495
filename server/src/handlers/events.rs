use axum::extract::{Path, State};
use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::{parse_id, JsonBody, QueryParams};
use crate::auth::{AdminPrincipal, Principal};
use crate::models::event::normalize_text;
use crate::models::{EventPatch, EventStatus, NewEvent, Pagination};
use crate::repositories::EventFilter;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, message, ok};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Status filter a caller may use. Non-admins are pinned to `published`.
pub fn resolve_status(
    is_admin: bool,
    requested: Option<&str>,
) -> Result<Option<EventStatus>, AppError> {
    let requested = requested
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    if !is_admin {
        return match requested.as_deref() {
            None | Some("published") => Ok(Some(EventStatus::Published)),
            Some(_) => Err(AppError::Forbidden("Access denied".to_string())),
        };
    }

    requested
        .map(|s| {
            s.parse::<EventStatus>()
                .map_err(|_| AppError::ValidationError("Invalid status.".to_string()))
        })
        .transpose()
}

/// Start of `YYYY-MM-DD` (UTC).
pub fn parse_date_start(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let date = parse_date(raw, "date_start")?;
    Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()).unwrap_or_default())
}

/// Last second of `YYYY-MM-DD` (UTC), so the whole day is included.
pub fn parse_date_end(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let date = parse_date(raw, "date_end")?;
    Ok(date.and_hms_opt(23, 59, 59).map(|dt| dt.and_utc()).unwrap_or_default())
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        AppError::ValidationError(format!("Invalid {field} format. Use YYYY-MM-DD."))
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListEventsQuery {
    pub fn to_filter(&self, is_admin: bool) -> Result<EventFilter, AppError> {
        Ok(EventFilter {
            date_start: non_empty(&self.date_start).map(parse_date_start).transpose()?,
            date_end: non_empty(&self.date_end).map(parse_date_end).transpose()?,
            status: resolve_status(is_admin, self.status.as_deref())?,
            title: non_empty(&self.title).map(normalize_text),
        })
    }
}

pub async fn list_events(
    principal: Principal,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListEventsQuery>,
) -> Result<Response, AppError> {
    let filter = query.to_filter(principal.is_admin)?;
    let pagination = Pagination::from_params(query.page.as_deref(), query.limit.as_deref());

    let events = state
        .events
        .get_all(&filter, pagination.limit, pagination.offset())
        .await?;
    let total = state.events.get_total_count(&filter).await?;

    Ok(ok(pagination.wrap(events, total)))
}

/// Drafts are reported as missing to non-admins.
pub async fn get_event(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let event = state
        .events
        .get(id)
        .await
        .map_err(|e| AppError::from_lookup(e, "Event not found"))?;

    if event.is_draft() && !principal.is_admin {
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    Ok(ok(event))
}

pub async fn create_event(
    _admin: AdminPrincipal,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewEvent>,
) -> Result<Response, AppError> {
    input.validate(Utc::now())?;
    let event = state.events.create(input).await?;
    Ok(created(event))
}

pub async fn update_event(
    _admin: AdminPrincipal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<EventPatch>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let current = state
        .events
        .get(id)
        .await
        .map_err(|e| AppError::from_lookup(e, "Event not found"))?;

    let updated = patch.apply(current);
    updated.validate(Utc::now())?;

    let event = state
        .events
        .update(updated)
        .await
        .map_err(|e| AppError::from_lookup(e, "Event not found"))?;
    Ok(ok(event))
}

pub async fn delete_event(
    _admin: AdminPrincipal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    state
        .events
        .delete(id)
        .await
        .map_err(|e| AppError::from_lookup(e, "Event not found"))?;
    Ok(message("Event deleted successfully"))
}
