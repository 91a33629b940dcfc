//! Data models module
//!
//! This module contains all data structures used throughout the crate

pub mod document;
pub mod event;
pub mod family;
pub mod meal;
pub mod medication;
pub mod shopping_list;
pub mod user;

// Re-export commonly used models
pub use document::{CreateDocumentRequest, Document, UpdateDocumentRequest};
pub use event::{CreateEventRequest, Event, UpdateEventRequest};
pub use family::{
    CreateFamilyRequest, Family, FamilyMember, FamilyRole, SharingCategory, SharingSettings,
    UpdateSharingRequest,
};
pub use meal::{
    CreateMealRequest, CreateRecipeRequest, Meal, MealSlot, Recipe, UpdateMealRequest,
    UpdateRecipeRequest,
};
pub use medication::{
    CreateMedicationRequest, LogIntakeRequest, Medication, MedicationLog, Schedule,
    UpdateMedicationRequest,
};
pub use shopping_list::{
    CreateShoppingListRequest, ShoppingItem, ShoppingList, UpdateShoppingListRequest,
};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserRole};
