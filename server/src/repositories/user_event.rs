use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{is_unique_violation, RepositoryError, SignupFilter, UserEventRepository};
use crate::models::Event;

const JOINED_EVENT_COLUMNS: &str = "e.id, e.title, e.long_description, e.short_description, \
     e.date_and_time, e.organizer, e.location, e.status";

/// Eligibility and insert share one statement; `NOW()` is read by the database.
const SIGNUP_INSERT: &str = "INSERT INTO user_events (user_id, event_id) \
     SELECT $1::BIGINT, $2::BIGINT \
     WHERE EXISTS (\
     SELECT 1 FROM events \
     WHERE id = $2 AND status = 'published' AND date_and_time > NOW())";

const SIGNED_UP_FROM: &str = "FROM events e JOIN user_events ue ON e.id = ue.event_id";

fn list_query(
    user_id: i64,
    filter: SignupFilter,
    limit: i64,
    offset: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {JOINED_EVENT_COLUMNS} {SIGNED_UP_FROM}"));
    filter.predicates(user_id).push_where(&mut qb);
    qb.push(" ORDER BY e.date_and_time, e.id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb
}

fn count_query(user_id: i64, filter: SignupFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) {SIGNED_UP_FROM}"));
    filter.predicates(user_id).push_where(&mut qb);
    qb
}

#[derive(Clone)]
pub struct PgUserEventRepository {
    pool: PgPool,
}

impl PgUserEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserEventRepository for PgUserEventRepository {
    async fn create_signup(&self, user_id: i64, event_id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(SIGNUP_INSERT)
            .bind(user_id)
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepositoryError::Conflict("Already signed up for this event".to_string())
                } else {
                    RepositoryError::from(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::SignupRejected);
        }
        tracing::info!(user_id, event_id, "User signed up for event");
        Ok(())
    }

    async fn get_all(
        &self,
        user_id: i64,
        filter: SignupFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, RepositoryError> {
        let mut qb = list_query(user_id, filter, limit, offset);
        let events = qb.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    async fn get_total_count(
        &self,
        user_id: i64,
        filter: SignupFilter,
    ) -> Result<i64, RepositoryError> {
        let mut qb = count_query(user_id, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }
}
