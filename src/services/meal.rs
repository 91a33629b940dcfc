//! Meal plan and recipe service

use tracing::info;

use crate::database::stores::Stores;
use crate::models::{
    CreateMealRequest, CreateRecipeRequest, Meal, Recipe, UpdateMealRequest, UpdateRecipeRequest,
};
use crate::services::auth::{ensure_owner, AccessPolicy, AuthContext};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct MealService {
    stores: Stores,
    policy: AccessPolicy,
}

impl MealService {
    pub fn new(stores: Stores, policy: AccessPolicy) -> Self {
        Self { stores, policy }
    }

    async fn load_meal(&self, id: i64) -> Result<Meal> {
        self.stores
            .meals
            .find_by_id(id)
            .await?
            .ok_or(NestMateError::NotFound { resource: "meal", id })
    }

    async fn load_recipe(&self, id: i64) -> Result<Recipe> {
        self.stores
            .recipes
            .find_by_id(id)
            .await?
            .ok_or(NestMateError::NotFound { resource: "recipe", id })
    }

    pub async fn create_meal(&self, ctx: &AuthContext, request: CreateMealRequest) -> Result<Meal> {
        if let Some(family_id) = request.family_id {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let meal = self.stores.meals.create(ctx.user_id, request).await?;
        info!(meal_id = meal.id, user_id = ctx.user_id, "Meal planned");
        Ok(meal)
    }

    pub async fn get_meal(&self, ctx: &AuthContext, id: i64) -> Result<Meal> {
        let meal = self.load_meal(id).await?;
        self.policy.ensure_readable(&meal, ctx.user_id).await?;
        Ok(meal)
    }

    pub async fn update_meal(
        &self,
        ctx: &AuthContext,
        id: i64,
        request: UpdateMealRequest,
    ) -> Result<Meal> {
        let meal = self.load_meal(id).await?;
        ensure_owner(&meal, ctx.user_id, "update")?;

        if let Some(family_id) = request.family_id.or(meal.family_id) {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let meal = self.stores.meals.update(id, request).await?;
        info!(meal_id = id, user_id = ctx.user_id, "Meal updated");
        Ok(meal)
    }

    pub async fn delete_meal(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let meal = self.load_meal(id).await?;
        ensure_owner(&meal, ctx.user_id, "delete")?;

        self.stores.meals.delete(id).await?;
        info!(meal_id = id, user_id = ctx.user_id, "Meal deleted");
        Ok(())
    }

    pub async fn list_meals(&self, ctx: &AuthContext) -> Result<Vec<Meal>> {
        self.stores.meals.find_for_owner(ctx.user_id).await
    }

    pub async fn create_recipe(
        &self,
        ctx: &AuthContext,
        request: CreateRecipeRequest,
    ) -> Result<Recipe> {
        if request.name.trim().is_empty() {
            return Err(NestMateError::Validation(
                "recipe name must not be empty".to_string(),
            ));
        }

        let recipe = self.stores.recipes.create(ctx.user_id, request).await?;
        info!(recipe_id = recipe.id, user_id = ctx.user_id, "Recipe created");
        Ok(recipe)
    }

    pub async fn get_recipe(&self, ctx: &AuthContext, id: i64) -> Result<Recipe> {
        let recipe = self.load_recipe(id).await?;
        self.policy.ensure_readable(&recipe, ctx.user_id).await?;
        Ok(recipe)
    }

    pub async fn update_recipe(
        &self,
        ctx: &AuthContext,
        id: i64,
        request: UpdateRecipeRequest,
    ) -> Result<Recipe> {
        let recipe = self.load_recipe(id).await?;
        ensure_owner(&recipe, ctx.user_id, "update")?;

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(NestMateError::Validation(
                    "recipe name must not be empty".to_string(),
                ));
            }
        }

        let recipe = self.stores.recipes.update(id, request).await?;
        info!(recipe_id = id, user_id = ctx.user_id, "Recipe updated");
        Ok(recipe)
    }

    pub async fn delete_recipe(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let recipe = self.load_recipe(id).await?;
        ensure_owner(&recipe, ctx.user_id, "delete")?;

        self.stores.recipes.delete(id).await?;
        info!(recipe_id = id, user_id = ctx.user_id, "Recipe deleted");
        Ok(())
    }

    pub async fn list_recipes(&self, ctx: &AuthContext) -> Result<Vec<Recipe>> {
        self.stores.recipes.find_for_owner(ctx.user_id).await
    }
}
