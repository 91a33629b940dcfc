//! Store traits and the store bundle
//!
//! Persistence is an external collaborator: the service layer talks to these
//! traits only, never to a concrete backend. Two backends exist — the
//! in-process [`MemoryStore`](super::memory::MemoryStore) used by tests and
//! embedders, and the sqlx-backed Postgres repositories in
//! [`postgres`](super::postgres).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::connection::DatabasePool;
use crate::models::*;
use crate::utils::errors::Result;

/// User records plus the reverse side of the membership bookkeeping.
///
/// `attach_family` / `detach_family` maintain `User.family_ids` and are the
/// second write of the two-write membership protocol; both are idempotent so
/// a caller can retry safely after a failure. Detaching from an absent user
/// is a no-op, attaching to one is `NotFound`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn attach_family(&self, user_id: i64, family_id: i64) -> Result<()>;
    async fn detach_family(&self, user_id: i64, family_id: i64) -> Result<()>;
}

/// Family aggregates: member list, roles and sharing toggles travel together.
#[async_trait]
pub trait FamilyStore: Send + Sync {
    /// Create a family with `created_by` as its sole admin member and
    /// default sharing settings.
    async fn create(&self, request: CreateFamilyRequest, created_by: i64) -> Result<Family>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Family>>;
    /// Whole-aggregate write used by membership and sharing mutations.
    async fn save(&self, family: &Family) -> Result<Family>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Families the user is currently a member of.
    async fn find_for_user(&self, user_id: i64) -> Result<Vec<Family>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, owner_user_id: i64, request: CreateEventRequest) -> Result<Event>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;
    async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Events the user owns or appears in `shared_with` for, ascending by start
    async fn find_for_user(&self, user_id: i64) -> Result<Vec<Event>>;
    /// Same visibility, restricted to `start_time` in `[from, until]`
    async fn find_visible_in_window(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait ShoppingListStore: Send + Sync {
    async fn create(
        &self,
        owner_user_id: i64,
        request: CreateShoppingListRequest,
    ) -> Result<ShoppingList>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ShoppingList>>;
    async fn update(&self, id: i64, request: UpdateShoppingListRequest) -> Result<ShoppingList>;
    async fn delete(&self, id: i64) -> Result<bool>;
    /// Lists the user owns or appears in `shared_with` for, most recently updated first
    async fn find_for_user(&self, user_id: i64) -> Result<Vec<ShoppingList>>;
    /// The urgent subset of `find_for_user`, same ordering
    async fn find_urgent_for_user(&self, user_id: i64) -> Result<Vec<ShoppingList>>;
}

#[async_trait]
pub trait MealStore: Send + Sync {
    async fn create(&self, owner_user_id: i64, request: CreateMealRequest) -> Result<Meal>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Meal>>;
    async fn update(&self, id: i64, request: UpdateMealRequest) -> Result<Meal>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Meal>>;
    /// Owner's meals with `date` in `[from, until)`, ascending by date
    async fn find_for_owner_in_window(
        &self,
        owner_user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Meal>>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn create(&self, owner_user_id: i64, request: CreateRecipeRequest) -> Result<Recipe>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>>;
    async fn update(&self, id: i64, request: UpdateRecipeRequest) -> Result<Recipe>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Recipe>>;
}

#[async_trait]
pub trait MedicationStore: Send + Sync {
    async fn create(
        &self,
        owner_user_id: i64,
        request: CreateMedicationRequest,
    ) -> Result<Medication>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Medication>>;
    async fn update(&self, id: i64, request: UpdateMedicationRequest) -> Result<Medication>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Medication>>;
    /// Coarse prefilter for the dashboard: medications with at least one
    /// active schedule. Day-of-week matching happens in the service.
    async fn find_due_candidates(&self, owner_user_id: i64) -> Result<Vec<Medication>>;
    /// Atomically decrement `remaining_amount` by 1, never below 0.
    async fn decrement_remaining(&self, id: i64) -> Result<Medication>;
    async fn append_log(
        &self,
        medication_id: i64,
        timestamp: DateTime<Utc>,
        taken: bool,
        notes: Option<String>,
    ) -> Result<MedicationLog>;
    /// Intake history, newest first
    async fn find_logs(&self, medication_id: i64) -> Result<Vec<MedicationLog>>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `storage_key` is minted by the service; the blob itself lives in the
    /// external file store.
    async fn create(
        &self,
        owner_user_id: i64,
        storage_key: String,
        request: CreateDocumentRequest,
    ) -> Result<Document>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Document>>;
    async fn update(&self, id: i64, request: UpdateDocumentRequest) -> Result<Document>;
    async fn delete(&self, id: i64) -> Result<bool>;
    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Document>>;
    /// Owner's documents with a non-null `expiry_date` in `[from, until]`,
    /// ascending by expiry
    async fn find_expiring(
        &self,
        owner_user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Document>>;
}

/// One store handle per aggregate
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub families: Arc<dyn FamilyStore>,
    pub events: Arc<dyn EventStore>,
    pub shopping_lists: Arc<dyn ShoppingListStore>,
    pub meals: Arc<dyn MealStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub medications: Arc<dyn MedicationStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Stores {
    /// All aggregates backed by a single in-process memory store
    pub fn memory() -> Self {
        let store = Arc::new(super::memory::MemoryStore::new());
        Self {
            users: store.clone(),
            families: store.clone(),
            events: store.clone(),
            shopping_lists: store.clone(),
            meals: store.clone(),
            recipes: store.clone(),
            medications: store.clone(),
            documents: store,
        }
    }

    /// All aggregates backed by Postgres repositories sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(super::postgres::UserRepository::new(pool.clone())),
            families: Arc::new(super::postgres::FamilyRepository::new(pool.clone())),
            events: Arc::new(super::postgres::EventRepository::new(pool.clone())),
            shopping_lists: Arc::new(super::postgres::ShoppingListRepository::new(pool.clone())),
            meals: Arc::new(super::postgres::MealRepository::new(pool.clone())),
            recipes: Arc::new(super::postgres::RecipeRepository::new(pool.clone())),
            medications: Arc::new(super::postgres::MedicationRepository::new(pool.clone())),
            documents: Arc::new(super::postgres::DocumentRepository::new(pool)),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
