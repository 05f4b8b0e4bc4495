use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{EventFilter, EventRepository, RepositoryError};
use crate::models::{Event, NewEvent};

pub(crate) const EVENT_COLUMNS: &str =
    "id, title, long_description, short_description, date_and_time, organizer, location, status";

fn list_query(filter: &EventFilter, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events"));
    filter.predicates().push_where(&mut qb);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb
}

fn count_query(filter: &EventFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM events");
    filter.predicates().push_where(&mut qb);
    qb
}

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, mut event: NewEvent) -> Result<Event, RepositoryError> {
        event.normalize();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO events (title, long_description, short_description, date_and_time, organizer, location, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&event.title)
        .bind(&event.long_description)
        .bind(&event.short_description)
        .bind(event.date_and_time)
        .bind(&event.organizer)
        .bind(&event.location)
        .bind(event.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(event_id = id, "Event created");
        Ok(event.into_event(id))
    }

    async fn get(&self, id: i64) -> Result<Event, RepositoryError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, mut event: Event) -> Result<Event, RepositoryError> {
        event.normalize();

        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = $1, long_description = $2, short_description = $3, date_and_time = $4,
                organizer = $5, location = $6, status = $7
            WHERE id = $8
            "#,
        )
        .bind(&event.title)
        .bind(&event.long_description)
        .bind(&event.short_description)
        .bind(event.date_and_time)
        .bind(&event.organizer)
        .bind(&event.location)
        .bind(event.status.as_str())
        .bind(event.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(event)
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(event_id = id, "Event deleted");
        Ok(())
    }

    async fn get_all(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, RepositoryError> {
        let mut qb = list_query(filter, limit, offset);
        let events = qb.build_query_as::<Event>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    async fn get_total_count(&self, filter: &EventFilter) -> Result<i64, RepositoryError> {
        let mut qb = count_query(filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }
}
