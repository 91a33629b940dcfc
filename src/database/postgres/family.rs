//! Family repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::stores::FamilyStore;
use crate::models::{CreateFamilyRequest, Family, FamilyMember, FamilyRole, SharingSettings};
use crate::utils::errors::{NestMateError, Result};

#[derive(Debug, sqlx::FromRow)]
struct FamilyRow {
    id: i64,
    name: String,
    created_by: i64,
    members: Json<Vec<FamilyMember>>,
    sharing: Json<SharingSettings>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FamilyRow> for Family {
    fn from(row: FamilyRow) -> Self {
        Family {
            id: row.id,
            name: row.name,
            created_by: row.created_by,
            members: row.members.0,
            sharing: row.sharing.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct FamilyRepository {
    pool: PgPool,
}

impl FamilyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FamilyStore for FamilyRepository {
    async fn create(&self, request: CreateFamilyRequest, created_by: i64) -> Result<Family> {
        let now = Utc::now();
        let members = vec![FamilyMember {
            user_id: created_by,
            role: FamilyRole::Admin,
            joined_at: now,
        }];

        let row = sqlx::query_as::<_, FamilyRow>(
            r#"
            INSERT INTO families (name, created_by, members, sharing, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, created_by, members, sharing, created_at, updated_at
            "#,
        )
        .bind(request.name)
        .bind(created_by)
        .bind(Json(members))
        .bind(Json(SharingSettings::default()))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Family>> {
        let row = sqlx::query_as::<_, FamilyRow>(
            "SELECT id, name, created_by, members, sharing, created_at, updated_at FROM families WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Family::from))
    }

    async fn save(&self, family: &Family) -> Result<Family> {
        let row = sqlx::query_as::<_, FamilyRow>(
            r#"
            UPDATE families
            SET name = $2, members = $3, sharing = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, name, created_by, members, sharing, created_at, updated_at
            "#,
        )
        .bind(family.id)
        .bind(&family.name)
        .bind(Json(&family.members))
        .bind(Json(&family.sharing))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound {
            resource: "family",
            id: family.id,
        })?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM families WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_user(&self, user_id: i64) -> Result<Vec<Family>> {
        // JSONB containment on the member list
        let marker = serde_json::json!([{ "user_id": user_id }]);
        let rows = sqlx::query_as::<_, FamilyRow>(
            r#"
            SELECT id, name, created_by, members, sharing, created_at, updated_at
            FROM families
            WHERE members @> $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(marker)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Family::from).collect())
    }
}
