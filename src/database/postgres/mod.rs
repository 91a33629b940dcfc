//! Postgres store backend
//!
//! One repository per aggregate, all sharing one connection pool. Queries use
//! the runtime `query_as` API; aggregates with nested collections travel as
//! JSONB columns through private row types, id sets as BIGINT arrays.

pub mod document;
pub mod event;
pub mod family;
pub mod meal;
pub mod medication;
pub mod shopping_list;
pub mod user;

// Re-export repositories
pub use document::DocumentRepository;
pub use event::EventRepository;
pub use family::FamilyRepository;
pub use meal::{MealRepository, RecipeRepository};
pub use medication::MedicationRepository;
pub use shopping_list::ShoppingListRepository;
pub use user::UserRepository;
