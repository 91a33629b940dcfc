//! Document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata for a stored document. The blob itself lives in the external
/// file store under `storage_key`.
///
/// Family read access requires all three of: current membership in
/// `family_id`, the per-record `is_shared` flag, and the family's
/// `share_documents` toggle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub owner_user_id: i64,
    pub family_id: Option<i64>,
    pub title: String,
    pub category: Option<String>,
    pub file_name: String,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub category: Option<String>,
    pub file_name: String,
    pub content_type: Option<String>,
    pub family_id: Option<i64>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_shared: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub family_id: Option<i64>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_shared: Option<bool>,
}
