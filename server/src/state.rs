use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::Config;
use crate::repositories::{
    EventRepository, PgEventRepository, PgUserEventRepository, PgUserRepository,
    UserEventRepository, UserRepository,
};

/// Shared dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventRepository>,
    pub users: Arc<dyn UserRepository>,
    pub signups: Arc<dyn UserEventRepository>,
    pub tokens: Arc<TokenIssuer>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        signups: Arc<dyn UserEventRepository>,
        tokens: TokenIssuer,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            events,
            users,
            signups,
            tokens: Arc::new(tokens),
            hasher,
        }
    }

    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self::new(
            Arc::new(PgEventRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgUserEventRepository::new(pool)),
            TokenIssuer::new(&config.jwt_secret),
            PasswordHasher::default(),
        )
    }
}
