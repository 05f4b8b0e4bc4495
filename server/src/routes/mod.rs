use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::config::{create_cors_layer, with_security_headers, Config};
use crate::handlers::{
    create_event, delete_event, get_event, health_check, list_events, list_user_events, login,
    promote_user, register, sign_up_for_event, update_event,
};
use crate::state::AppState;

/// Routes under `/api/v1`; every one requires a bearer token.
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/:id/signup", post(sign_up_for_event))
        .route("/user/events", get(list_user_events))
        .route("/users/:username/promote", patch(promote_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .nest("/api/v1", api_routes(&state))
        .layer(TraceLayer::new_for_http());

    with_security_headers(router, config.production)
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}
