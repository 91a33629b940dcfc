//! User repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::stores::UserStore;
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use crate::utils::errors::{NestMateError, Result};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    display_name: String,
    role: String,
    family_ids: Vec<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = NestMateError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            display_name: row.display_name,
            role: row.role.parse::<UserRole>()?,
            family_ids: row.family_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (display_name, role, family_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, display_name, role, family_ids, created_at, updated_at
            "#,
        )
        .bind(request.display_name)
        .bind(request.role.as_str())
        .bind(Vec::<i64>::new())
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, display_name, role, family_ids, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                role = COALESCE($3, role),
                updated_at = $4
            WHERE id = $1
            RETURNING id, display_name, role, family_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.display_name)
        .bind(request.role.map(|r| r.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound { resource: "user", id })?;

        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach_family(&self, user_id: i64, family_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET family_ids = array_append(family_ids, $2), updated_at = $3
            WHERE id = $1 AND NOT ($2 = ANY(family_ids))
            "#,
        )
        .bind(user_id)
        .bind(family_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        // Zero rows means either already attached or no such user
        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(NestMateError::NotFound {
                    resource: "user",
                    id: user_id,
                });
            }
        }

        Ok(())
    }

    async fn detach_family(&self, user_id: i64, family_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET family_ids = array_remove(family_ids, $2), updated_at = $3
            WHERE id = $1 AND $2 = ANY(family_ids)
            "#,
        )
        .bind(user_id)
        .bind(family_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
