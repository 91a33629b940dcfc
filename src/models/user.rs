//! User model
//!
//! Users are owned by the external authentication subsystem; the core reads
//! them and maintains only the reverse side of family membership
//! (`family_ids`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::NestMateError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    /// Informational household role; never consulted for authorization
    pub role: UserRole,
    pub family_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Household role tag shown in the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Parent,
    Child,
    Other,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Parent => "parent",
            UserRole::Child => "child",
            UserRole::Other => "other",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = NestMateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "parent" => Ok(UserRole::Parent),
            "child" => Ok(UserRole::Child),
            "other" => Ok(UserRole::Other),
            other => Err(NestMateError::Validation(format!("unknown user role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
}
