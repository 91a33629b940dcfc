//! Shopping list model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shopping list owned by a user and optionally shared with specific
/// other users through `shared_with`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    pub owner_user_id: i64,
    pub family_id: Option<i64>,
    pub shared_with: Vec<i64>,
    pub items: Vec<ShoppingItem>,
    pub is_urgent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShoppingListRequest {
    pub name: String,
    pub family_id: Option<i64>,
    #[serde(default)]
    pub shared_with: Vec<i64>,
    #[serde(default)]
    pub items: Vec<ShoppingItem>,
    #[serde(default)]
    pub is_urgent: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShoppingListRequest {
    pub name: Option<String>,
    pub family_id: Option<i64>,
    pub shared_with: Option<Vec<i64>>,
    pub items: Option<Vec<ShoppingItem>>,
    pub is_urgent: Option<bool>,
}
