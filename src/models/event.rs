//! Calendar event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A calendar event owned by a user.
///
/// Read access for other users comes from the explicit `shared_with` grant
/// list; `family_id` is a filtering hint for clients, not a grant, and
/// `is_shared` is surface metadata.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub owner_user_id: i64,
    pub family_id: Option<i64>,
    pub shared_with: Vec<i64>,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub family_id: Option<i64>,
    #[serde(default)]
    pub shared_with: Vec<i64>,
    #[serde(default)]
    pub is_shared: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub family_id: Option<i64>,
    pub shared_with: Option<Vec<i64>>,
    pub is_shared: Option<bool>,
}
