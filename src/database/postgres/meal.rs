//! Meal plan and recipe repository implementations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::stores::{MealStore, RecipeStore};
use crate::models::{
    CreateMealRequest, CreateRecipeRequest, Meal, MealSlot, Recipe, UpdateMealRequest,
    UpdateRecipeRequest,
};
use crate::utils::errors::{NestMateError, Result};

#[derive(Debug, sqlx::FromRow)]
struct MealRow {
    id: i64,
    owner_user_id: i64,
    family_id: Option<i64>,
    date: DateTime<Utc>,
    slot: String,
    recipe_id: Option<i64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MealRow> for Meal {
    type Error = NestMateError;

    fn try_from(row: MealRow) -> Result<Self> {
        Ok(Meal {
            id: row.id,
            owner_user_id: row.owner_user_id,
            family_id: row.family_id,
            date: row.date,
            slot: row.slot.parse::<MealSlot>()?,
            recipe_id: row.recipe_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct MealRepository {
    pool: PgPool,
}

impl MealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealStore for MealRepository {
    async fn create(&self, owner_user_id: i64, request: CreateMealRequest) -> Result<Meal> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            INSERT INTO meals (owner_user_id, family_id, date, slot, recipe_id, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_user_id, family_id, date, slot, recipe_id, notes, created_at, updated_at
            "#,
        )
        .bind(owner_user_id)
        .bind(request.family_id)
        .bind(request.date)
        .bind(request.slot.as_str())
        .bind(request.recipe_id)
        .bind(request.notes)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Meal>> {
        let row = sqlx::query_as::<_, MealRow>(
            "SELECT id, owner_user_id, family_id, date, slot, recipe_id, notes, created_at, updated_at FROM meals WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Meal::try_from).transpose()
    }

    async fn update(&self, id: i64, request: UpdateMealRequest) -> Result<Meal> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            UPDATE meals
            SET date = COALESCE($2, date),
                slot = COALESCE($3, slot),
                family_id = COALESCE($4, family_id),
                recipe_id = COALESCE($5, recipe_id),
                notes = COALESCE($6, notes),
                updated_at = $7
            WHERE id = $1
            RETURNING id, owner_user_id, family_id, date, slot, recipe_id, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.date)
        .bind(request.slot.map(|s| s.as_str()))
        .bind(request.family_id)
        .bind(request.recipe_id)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound { resource: "meal", id })?;

        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, owner_user_id, family_id, date, slot, recipe_id, notes, created_at, updated_at
            FROM meals
            WHERE owner_user_id = $1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Meal::try_from).collect()
    }

    async fn find_for_owner_in_window(
        &self,
        owner_user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, owner_user_id, family_id, date, slot, recipe_id, notes, created_at, updated_at
            FROM meals
            WHERE owner_user_id = $1 AND date >= $2 AND date < $3
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Meal::try_from).collect()
    }
}

#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for RecipeRepository {
    async fn create(&self, owner_user_id: i64, request: CreateRecipeRequest) -> Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (owner_user_id, name, description, ingredients, steps, is_public, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, owner_user_id, name, description, ingredients, steps, is_public, created_at, updated_at
            "#,
        )
        .bind(owner_user_id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.ingredients)
        .bind(request.steps)
        .bind(request.is_public)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "SELECT id, owner_user_id, name, description, ingredients, steps, is_public, created_at, updated_at FROM recipes WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    async fn update(&self, id: i64, request: UpdateRecipeRequest) -> Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                ingredients = COALESCE($4, ingredients),
                steps = COALESCE($5, steps),
                is_public = COALESCE($6, is_public),
                updated_at = $7
            WHERE id = $1
            RETURNING id, owner_user_id, name, description, ingredients, steps, is_public, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.name)
        .bind(request.description)
        .bind(request.ingredients)
        .bind(request.steps)
        .bind(request.is_public)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound { resource: "recipe", id })?;

        Ok(recipe)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, owner_user_id, name, description, ingredients, steps, is_public, created_at, updated_at
            FROM recipes
            WHERE owner_user_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }
}
