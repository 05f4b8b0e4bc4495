//! Data access for events, users and signups.
//!
//! Handlers only see the traits defined here; the Postgres implementations
//! live in the submodules and are wired up in [`crate::state::AppState`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Event, NewEvent, User};

pub mod event;
pub mod filter;
pub mod query;
pub mod user;
pub mod user_event;

pub use event::PgEventRepository;
pub use filter::{EventFilter, SignupFilter};
pub use user::PgUserRepository;
pub use user_event::PgUserEventRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched, or zero rows were affected.
    #[error("record not found")]
    NotFound,

    /// The conditional insert found no eligible event.
    #[error("event is not open for signup")]
    SignupRejected,

    #[error("{0}")]
    Conflict(String),

    #[error("persistence error: {0}")]
    Persistence(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            other => RepositoryError::Persistence(other),
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists a new event with its searchable fields lowercased.
    async fn create(&self, event: NewEvent) -> Result<Event, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Event, RepositoryError>;

    /// Overwrites every field of the stored event keyed by `event.id`.
    async fn update(&self, event: Event) -> Result<Event, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    async fn get_all(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, RepositoryError>;

    async fn get_total_count(&self, filter: &EventFilter) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError>;

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;

    async fn set_admin(&self, id: i64, is_admin: bool) -> Result<(), RepositoryError>;

    async fn count_admins(&self) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait UserEventRepository: Send + Sync {
    /// Records a signup only if the event exists, is published and starts in
    /// the future. Eligibility is checked in the same statement as the insert.
    async fn create_signup(&self, user_id: i64, event_id: i64) -> Result<(), RepositoryError>;

    async fn get_all(
        &self,
        user_id: i64,
        filter: SignupFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, RepositoryError>;

    async fn get_total_count(
        &self,
        user_id: i64,
        filter: SignupFilter,
    ) -> Result<i64, RepositoryError>;
}
