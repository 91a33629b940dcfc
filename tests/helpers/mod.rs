//! Shared helpers for the integration suite
//!
//! Every test builds its own in-memory store bundle and service stack, so
//! tests are hermetic and need no external services or ordering between
//! them. Hitting the Postgres repositories instead only needs a
//! `Stores::postgres(pool)` swap here.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use NestMate::config::Settings;
use NestMate::database::Stores;
use NestMate::models::{
    CreateDocumentRequest, CreateEventRequest, CreateMealRequest, CreateMedicationRequest,
    CreateShoppingListRequest, CreateUserRequest, MealSlot, Schedule, UserRole,
};
use NestMate::services::{AuthContext, ServiceFactory};

/// A fully wired service stack over fresh in-memory stores
pub struct TestApp {
    pub stores: Stores,
    pub services: ServiceFactory,
}

impl TestApp {
    pub fn new() -> Self {
        let stores = Stores::memory();
        let services = ServiceFactory::new(stores.clone(), &Settings::default());
        Self { stores, services }
    }

    /// Register a user and return their id
    pub async fn user(&self, name: &str) -> i64 {
        self.stores
            .users
            .create(CreateUserRequest {
                display_name: name.to_string(),
                role: UserRole::Parent,
            })
            .await
            .expect("user create failed")
            .id
    }
}

pub fn ctx(user_id: i64) -> AuthContext {
    AuthContext::new(user_id)
}

/// Fixed reference time for window assertions: a Wednesday at noon, far
/// from any day boundary. Weekday index 3 in the Sunday-based convention.
pub fn wednesday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap()
}

pub fn event_request(title: &str, start: DateTime<Utc>) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        description: None,
        start_time: start,
        end_time: None,
        location: None,
        family_id: None,
        shared_with: vec![],
        is_shared: false,
    }
}

pub fn list_request(name: &str, urgent: bool) -> CreateShoppingListRequest {
    CreateShoppingListRequest {
        name: name.to_string(),
        family_id: None,
        shared_with: vec![],
        items: vec![],
        is_urgent: urgent,
    }
}

pub fn meal_request(date: DateTime<Utc>, slot: MealSlot) -> CreateMealRequest {
    CreateMealRequest {
        date,
        slot,
        family_id: None,
        recipe_id: None,
        notes: None,
    }
}

/// Medication with a single active schedule on the given weekdays
pub fn medication_request(name: &str, days: Vec<u8>, remaining: i32) -> CreateMedicationRequest {
    CreateMedicationRequest {
        name: name.to_string(),
        dosage: Some("1 tablet".to_string()),
        family_id: None,
        schedules: vec![Schedule {
            time: "08:00".to_string(),
            days_of_week: days,
            active: true,
        }],
        remaining_amount: remaining,
        refill_threshold: 3,
        refill_reminder: true,
    }
}

pub fn document_request(title: &str, expiry_date: Option<DateTime<Utc>>) -> CreateDocumentRequest {
    CreateDocumentRequest {
        title: title.to_string(),
        category: None,
        file_name: format!("{}.pdf", title.to_lowercase().replace(' ', "-")),
        content_type: Some("application/pdf".to_string()),
        family_id: None,
        expiry_date,
        is_shared: false,
    }
}
