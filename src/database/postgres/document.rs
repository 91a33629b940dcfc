//! Document repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::stores::DocumentStore;
use crate::models::{CreateDocumentRequest, Document, UpdateDocumentRequest};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn create(
        &self,
        owner_user_id: i64,
        storage_key: String,
        request: CreateDocumentRequest,
    ) -> Result<Document> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (owner_user_id, family_id, title, category, file_name, storage_key, content_type, expiry_date, is_shared, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, owner_user_id, family_id, title, category, file_name, storage_key, content_type, expiry_date, is_shared, created_at, updated_at
            "#,
        )
        .bind(owner_user_id)
        .bind(request.family_id)
        .bind(request.title)
        .bind(request.category)
        .bind(request.file_name)
        .bind(storage_key)
        .bind(request.content_type)
        .bind(request.expiry_date)
        .bind(request.is_shared)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            "SELECT id, owner_user_id, family_id, title, category, file_name, storage_key, content_type, expiry_date, is_shared, created_at, updated_at FROM documents WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn update(&self, id: i64, request: UpdateDocumentRequest) -> Result<Document> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET title = COALESCE($2, title),
                category = COALESCE($3, category),
                file_name = COALESCE($4, file_name),
                content_type = COALESCE($5, content_type),
                family_id = COALESCE($6, family_id),
                expiry_date = COALESCE($7, expiry_date),
                is_shared = COALESCE($8, is_shared),
                updated_at = $9
            WHERE id = $1
            RETURNING id, owner_user_id, family_id, title, category, file_name, storage_key, content_type, expiry_date, is_shared, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.title)
        .bind(request.category)
        .bind(request.file_name)
        .bind(request.content_type)
        .bind(request.family_id)
        .bind(request.expiry_date)
        .bind(request.is_shared)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound {
            resource: "document",
            id,
        })?;

        Ok(document)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, owner_user_id, family_id, title, category, file_name, storage_key, content_type, expiry_date, is_shared, created_at, updated_at
            FROM documents
            WHERE owner_user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn find_expiring(
        &self,
        owner_user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, owner_user_id, family_id, title, category, file_name, storage_key, content_type, expiry_date, is_shared, created_at, updated_at
            FROM documents
            WHERE owner_user_id = $1
              AND expiry_date IS NOT NULL
              AND expiry_date >= $2 AND expiry_date <= $3
            ORDER BY expiry_date ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}
