//! Services module
//!
//! Business logic: the sharing policy, the family membership registry, one
//! CRUD service per resource type and the dashboard aggregation.

pub mod auth;
pub mod dashboard;
pub mod document;
pub mod event;
pub mod family;
pub mod meal;
pub mod medication;
pub mod shopping_list;

// Re-export commonly used services
pub use auth::{
    ensure_owner, evaluate_access, Access, AccessPolicy, AuthContext, Shareable, SharingScope,
};
pub use dashboard::{DashboardService, DashboardView};
pub use document::DocumentService;
pub use event::EventService;
pub use family::FamilyService;
pub use meal::MealService;
pub use medication::MedicationService;
pub use shopping_list::ShoppingListService;

use crate::config::Settings;
use crate::database::stores::Stores;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub family_service: FamilyService,
    pub event_service: EventService,
    pub shopping_list_service: ShoppingListService,
    pub meal_service: MealService,
    pub medication_service: MedicationService,
    pub document_service: DocumentService,
    pub dashboard_service: DashboardService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized.
    ///
    /// Every service shares the same store bundle and the same access
    /// policy, so a sharing toggle flipped through one service is visible
    /// to all of them on the next read.
    pub fn new(stores: Stores, settings: &Settings) -> Self {
        let policy = AccessPolicy::new(stores.families.clone());

        Self {
            family_service: FamilyService::new(stores.clone()),
            event_service: EventService::new(stores.clone(), policy.clone()),
            shopping_list_service: ShoppingListService::new(stores.clone(), policy.clone()),
            meal_service: MealService::new(stores.clone(), policy.clone()),
            medication_service: MedicationService::new(stores.clone(), policy.clone()),
            document_service: DocumentService::new(stores.clone(), policy),
            dashboard_service: DashboardService::new(stores, settings.dashboard.clone()),
        }
    }
}
