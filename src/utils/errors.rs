//! Error handling for NestMate
//!
//! This module defines the main error type used throughout the crate
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for NestMate operations
#[derive(Error, Debug)]
pub enum NestMateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User {user_id} is not a member of family {family_id}")]
    InvalidMembership { family_id: i64, user_id: i64 },

    #[error("User {user_id} is the last admin of family {family_id} and cannot be removed or demoted")]
    LastAdminViolation { family_id: i64, user_id: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Dashboard fetch for {category} failed: {source}")]
    Dependency {
        category: &'static str,
        #[source]
        source: Box<NestMateError>,
    },
}

/// Stable error kinds exposed to the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidMembership,
    LastAdminViolation,
    Validation,
    DependencyFailure,
    Config,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidMembership => "invalid_membership",
            ErrorKind::LastAdminViolation => "last_admin_violation",
            ErrorKind::Validation => "validation",
            ErrorKind::DependencyFailure => "dependency_failure",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NestMateError {
    /// Map the error to its stable kind for the transport layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            NestMateError::NotFound { .. } => ErrorKind::NotFound,
            NestMateError::Forbidden(_) => ErrorKind::Forbidden,
            NestMateError::InvalidMembership { .. } => ErrorKind::InvalidMembership,
            NestMateError::LastAdminViolation { .. } => ErrorKind::LastAdminViolation,
            NestMateError::Validation(_) => ErrorKind::Validation,
            NestMateError::Dependency { .. } => ErrorKind::DependencyFailure,
            NestMateError::Config(_) => ErrorKind::Config,
            NestMateError::Database(_)
            | NestMateError::Migration(_)
            | NestMateError::Serialization(_)
            | NestMateError::Io(_) => ErrorKind::Internal,
        }
    }

    /// Check if the error was caused by the caller's request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound
                | ErrorKind::Forbidden
                | ErrorKind::InvalidMembership
                | ErrorKind::LastAdminViolation
                | ErrorKind::Validation
        )
    }

    /// Forbidden error that reveals nothing about the resource beyond the kind
    pub fn forbidden(action: &str) -> Self {
        NestMateError::Forbidden(format!("not allowed to {action}"))
    }
}

/// Result type alias for NestMate operations
pub type Result<T> = std::result::Result<T, NestMateError>;
