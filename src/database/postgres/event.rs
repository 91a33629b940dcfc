//! Event repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::stores::EventStore;
use crate::models::{CreateEventRequest, Event, UpdateEventRequest};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    async fn create(&self, owner_user_id: i64, request: CreateEventRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, start_time, end_time, location, owner_user_id, family_id, shared_with, is_shared, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, description, start_time, end_time, location, owner_user_id, family_id, shared_with, is_shared, created_at, updated_at
            "#,
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.location)
        .bind(owner_user_id)
        .bind(request.family_id)
        .bind(request.shared_with)
        .bind(request.is_shared)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, start_time, end_time, location, owner_user_id, family_id, shared_with, is_shared, created_at, updated_at FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                location = COALESCE($6, location),
                family_id = COALESCE($7, family_id),
                shared_with = COALESCE($8, shared_with),
                is_shared = COALESCE($9, is_shared),
                updated_at = $10
            WHERE id = $1
            RETURNING id, title, description, start_time, end_time, location, owner_user_id, family_id, shared_with, is_shared, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.location)
        .bind(request.family_id)
        .bind(request.shared_with)
        .bind(request.is_shared)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound { resource: "event", id })?;

        Ok(event)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_user(&self, user_id: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, start_time, end_time, location, owner_user_id, family_id, shared_with, is_shared, created_at, updated_at
            FROM events
            WHERE owner_user_id = $1 OR $1 = ANY(shared_with)
            ORDER BY start_time ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_visible_in_window(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, start_time, end_time, location, owner_user_id, family_id, shared_with, is_shared, created_at, updated_at
            FROM events
            WHERE (owner_user_id = $1 OR $1 = ANY(shared_with))
              AND start_time >= $2 AND start_time <= $3
            ORDER BY start_time ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
