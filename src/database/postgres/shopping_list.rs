//! Shopping list repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::stores::ShoppingListStore;
use crate::models::{
    CreateShoppingListRequest, ShoppingItem, ShoppingList, UpdateShoppingListRequest,
};
use crate::utils::errors::{NestMateError, Result};

#[derive(Debug, sqlx::FromRow)]
struct ShoppingListRow {
    id: i64,
    name: String,
    owner_user_id: i64,
    family_id: Option<i64>,
    shared_with: Vec<i64>,
    items: Json<Vec<ShoppingItem>>,
    is_urgent: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShoppingListRow> for ShoppingList {
    fn from(row: ShoppingListRow) -> Self {
        ShoppingList {
            id: row.id,
            name: row.name,
            owner_user_id: row.owner_user_id,
            family_id: row.family_id,
            shared_with: row.shared_with,
            items: row.items.0,
            is_urgent: row.is_urgent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ShoppingListRepository {
    pool: PgPool,
}

impl ShoppingListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShoppingListStore for ShoppingListRepository {
    async fn create(
        &self,
        owner_user_id: i64,
        request: CreateShoppingListRequest,
    ) -> Result<ShoppingList> {
        let row = sqlx::query_as::<_, ShoppingListRow>(
            r#"
            INSERT INTO shopping_lists (name, owner_user_id, family_id, shared_with, items, is_urgent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, owner_user_id, family_id, shared_with, items, is_urgent, created_at, updated_at
            "#,
        )
        .bind(request.name)
        .bind(owner_user_id)
        .bind(request.family_id)
        .bind(request.shared_with)
        .bind(Json(request.items))
        .bind(request.is_urgent)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShoppingList>> {
        let row = sqlx::query_as::<_, ShoppingListRow>(
            "SELECT id, name, owner_user_id, family_id, shared_with, items, is_urgent, created_at, updated_at FROM shopping_lists WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShoppingList::from))
    }

    async fn update(&self, id: i64, request: UpdateShoppingListRequest) -> Result<ShoppingList> {
        let row = sqlx::query_as::<_, ShoppingListRow>(
            r#"
            UPDATE shopping_lists
            SET name = COALESCE($2, name),
                family_id = COALESCE($3, family_id),
                shared_with = COALESCE($4, shared_with),
                items = COALESCE($5, items),
                is_urgent = COALESCE($6, is_urgent),
                updated_at = $7
            WHERE id = $1
            RETURNING id, name, owner_user_id, family_id, shared_with, items, is_urgent, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.name)
        .bind(request.family_id)
        .bind(request.shared_with)
        .bind(request.items.map(Json))
        .bind(request.is_urgent)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound {
            resource: "shopping_list",
            id,
        })?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_user(&self, user_id: i64) -> Result<Vec<ShoppingList>> {
        let rows = sqlx::query_as::<_, ShoppingListRow>(
            r#"
            SELECT id, name, owner_user_id, family_id, shared_with, items, is_urgent, created_at, updated_at
            FROM shopping_lists
            WHERE owner_user_id = $1 OR $1 = ANY(shared_with)
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShoppingList::from).collect())
    }

    async fn find_urgent_for_user(&self, user_id: i64) -> Result<Vec<ShoppingList>> {
        let rows = sqlx::query_as::<_, ShoppingListRow>(
            r#"
            SELECT id, name, owner_user_id, family_id, shared_with, items, is_urgent, created_at, updated_at
            FROM shopping_lists
            WHERE (owner_user_id = $1 OR $1 = ANY(shared_with)) AND is_urgent = true
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShoppingList::from).collect())
    }
}
