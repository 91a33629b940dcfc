//! Database module
//!
//! Connection handling, the store trait seam, and the two backends
//! (in-process memory and Postgres).

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod stores;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, run_migrations, DatabaseConfig, DatabasePool};
pub use memory::MemoryStore;
pub use stores::{
    DocumentStore, EventStore, FamilyStore, MealStore, MedicationStore, RecipeStore,
    ShoppingListStore, Stores, UserStore,
};
