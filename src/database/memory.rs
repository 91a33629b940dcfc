//! In-process store backend
//!
//! A single `MemoryStore` implements every store trait over one locked state
//! map. Tests and embedders use it instead of Postgres; semantics (ordering,
//! window bounds, idempotency, the decrement floor) match the sqlx backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::stores::{
    DocumentStore, EventStore, FamilyStore, MealStore, MedicationStore, RecipeStore,
    ShoppingListStore, UserStore,
};
use crate::models::*;
use crate::utils::errors::{NestMateError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    users: HashMap<i64, User>,
    families: HashMap<i64, Family>,
    events: HashMap<i64, Event>,
    shopping_lists: HashMap<i64, ShoppingList>,
    meals: HashMap<i64, Meal>,
    recipes: HashMap<i64, Recipe>,
    medications: HashMap<i64, Medication>,
    medication_logs: HashMap<i64, Vec<MedicationLog>>,
    documents: HashMap<i64, Document>,
}

impl MemoryState {
    fn mint_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(resource: &'static str, id: i64) -> NestMateError {
    NestMateError::NotFound { resource, id }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let user = User {
            id: state.mint_id(),
            display_name: request.display_name,
            role: request.role,
            family_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        if let Some(display_name) = request.display_name {
            user.display_name = display_name;
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.users.remove(&id).is_some())
    }

    async fn attach_family(&self, user_id: i64, family_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| not_found("user", user_id))?;
        if !user.family_ids.contains(&family_id) {
            user.family_ids.push(family_id);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn detach_family(&self, user_id: i64, family_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            let before = user.family_ids.len();
            user.family_ids.retain(|id| *id != family_id);
            if user.family_ids.len() != before {
                user.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FamilyStore for MemoryStore {
    async fn create(&self, request: CreateFamilyRequest, created_by: i64) -> Result<Family> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let family = Family {
            id: state.mint_id(),
            name: request.name,
            created_by,
            members: vec![FamilyMember {
                user_id: created_by,
                role: FamilyRole::Admin,
                joined_at: now,
            }],
            sharing: SharingSettings::default(),
            created_at: now,
            updated_at: now,
        };
        state.families.insert(family.id, family.clone());
        Ok(family)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Family>> {
        Ok(self.state.read().await.families.get(&id).cloned())
    }

    async fn save(&self, family: &Family) -> Result<Family> {
        let mut state = self.state.write().await;
        if !state.families.contains_key(&family.id) {
            return Err(not_found("family", family.id));
        }
        let mut updated = family.clone();
        updated.updated_at = Utc::now();
        state.families.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.families.remove(&id).is_some())
    }

    async fn find_for_user(&self, user_id: i64) -> Result<Vec<Family>> {
        let state = self.state.read().await;
        let mut families: Vec<Family> = state
            .families
            .values()
            .filter(|f| f.is_member(user_id))
            .cloned()
            .collect();
        families.sort_by_key(|f| (f.created_at, f.id));
        Ok(families)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, owner_user_id: i64, request: CreateEventRequest) -> Result<Event> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let event = Event {
            id: state.mint_id(),
            title: request.title,
            description: request.description,
            start_time: request.start_time,
            end_time: request.end_time,
            location: request.location,
            owner_user_id,
            family_id: request.family_id,
            shared_with: request.shared_with,
            is_shared: request.is_shared,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.state.read().await.events.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event> {
        let mut state = self.state.write().await;
        let event = state.events.get_mut(&id).ok_or_else(|| not_found("event", id))?;
        if let Some(title) = request.title {
            event.title = title;
        }
        if let Some(description) = request.description {
            event.description = Some(description);
        }
        if let Some(start_time) = request.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            event.end_time = Some(end_time);
        }
        if let Some(location) = request.location {
            event.location = Some(location);
        }
        if let Some(family_id) = request.family_id {
            event.family_id = Some(family_id);
        }
        if let Some(shared_with) = request.shared_with {
            event.shared_with = shared_with;
        }
        if let Some(is_shared) = request.is_shared {
            event.is_shared = is_shared;
        }
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.events.remove(&id).is_some())
    }

    async fn find_for_user(&self, user_id: i64) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| e.owner_user_id == user_id || e.shared_with.contains(&user_id))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start_time, e.id));
        Ok(events)
    }

    async fn find_visible_in_window(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| e.owner_user_id == user_id || e.shared_with.contains(&user_id))
            .filter(|e| e.start_time >= from && e.start_time <= until)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start_time, e.id));
        Ok(events)
    }
}

#[async_trait]
impl ShoppingListStore for MemoryStore {
    async fn create(
        &self,
        owner_user_id: i64,
        request: CreateShoppingListRequest,
    ) -> Result<ShoppingList> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let list = ShoppingList {
            id: state.mint_id(),
            name: request.name,
            owner_user_id,
            family_id: request.family_id,
            shared_with: request.shared_with,
            items: request.items,
            is_urgent: request.is_urgent,
            created_at: now,
            updated_at: now,
        };
        state.shopping_lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShoppingList>> {
        Ok(self.state.read().await.shopping_lists.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateShoppingListRequest) -> Result<ShoppingList> {
        let mut state = self.state.write().await;
        let list = state
            .shopping_lists
            .get_mut(&id)
            .ok_or_else(|| not_found("shopping_list", id))?;
        if let Some(name) = request.name {
            list.name = name;
        }
        if let Some(family_id) = request.family_id {
            list.family_id = Some(family_id);
        }
        if let Some(shared_with) = request.shared_with {
            list.shared_with = shared_with;
        }
        if let Some(items) = request.items {
            list.items = items;
        }
        if let Some(is_urgent) = request.is_urgent {
            list.is_urgent = is_urgent;
        }
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.shopping_lists.remove(&id).is_some())
    }

    async fn find_for_user(&self, user_id: i64) -> Result<Vec<ShoppingList>> {
        let state = self.state.read().await;
        let mut lists: Vec<ShoppingList> = state
            .shopping_lists
            .values()
            .filter(|l| l.owner_user_id == user_id || l.shared_with.contains(&user_id))
            .cloned()
            .collect();
        lists.sort_by_key(|l| (std::cmp::Reverse(l.updated_at), std::cmp::Reverse(l.id)));
        Ok(lists)
    }

    async fn find_urgent_for_user(&self, user_id: i64) -> Result<Vec<ShoppingList>> {
        let mut lists = ShoppingListStore::find_for_user(self, user_id).await?;
        lists.retain(|l| l.is_urgent);
        Ok(lists)
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn create(&self, owner_user_id: i64, request: CreateMealRequest) -> Result<Meal> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let meal = Meal {
            id: state.mint_id(),
            owner_user_id,
            family_id: request.family_id,
            date: request.date,
            slot: request.slot,
            recipe_id: request.recipe_id,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        state.meals.insert(meal.id, meal.clone());
        Ok(meal)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Meal>> {
        Ok(self.state.read().await.meals.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateMealRequest) -> Result<Meal> {
        let mut state = self.state.write().await;
        let meal = state.meals.get_mut(&id).ok_or_else(|| not_found("meal", id))?;
        if let Some(date) = request.date {
            meal.date = date;
        }
        if let Some(slot) = request.slot {
            meal.slot = slot;
        }
        if let Some(family_id) = request.family_id {
            meal.family_id = Some(family_id);
        }
        if let Some(recipe_id) = request.recipe_id {
            meal.recipe_id = Some(recipe_id);
        }
        if let Some(notes) = request.notes {
            meal.notes = Some(notes);
        }
        meal.updated_at = Utc::now();
        Ok(meal.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.meals.remove(&id).is_some())
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Meal>> {
        let state = self.state.read().await;
        let mut meals: Vec<Meal> = state
            .meals
            .values()
            .filter(|m| m.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        meals.sort_by_key(|m| (m.date, m.id));
        Ok(meals)
    }

    async fn find_for_owner_in_window(
        &self,
        owner_user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Meal>> {
        let mut meals = MealStore::find_for_owner(self, owner_user_id).await?;
        meals.retain(|m| m.date >= from && m.date < until);
        Ok(meals)
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn create(&self, owner_user_id: i64, request: CreateRecipeRequest) -> Result<Recipe> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let recipe = Recipe {
            id: state.mint_id(),
            owner_user_id,
            name: request.name,
            description: request.description,
            ingredients: request.ingredients,
            steps: request.steps,
            is_public: request.is_public,
            created_at: now,
            updated_at: now,
        };
        state.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        Ok(self.state.read().await.recipes.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateRecipeRequest) -> Result<Recipe> {
        let mut state = self.state.write().await;
        let recipe = state
            .recipes
            .get_mut(&id)
            .ok_or_else(|| not_found("recipe", id))?;
        if let Some(name) = request.name {
            recipe.name = name;
        }
        if let Some(description) = request.description {
            recipe.description = Some(description);
        }
        if let Some(ingredients) = request.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(steps) = request.steps {
            recipe.steps = steps;
        }
        if let Some(is_public) = request.is_public {
            recipe.is_public = is_public;
        }
        recipe.updated_at = Utc::now();
        Ok(recipe.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.recipes.remove(&id).is_some())
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Recipe>> {
        let state = self.state.read().await;
        let mut recipes: Vec<Recipe> = state
            .recipes
            .values()
            .filter(|r| r.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        recipes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(recipes)
    }
}

#[async_trait]
impl MedicationStore for MemoryStore {
    async fn create(
        &self,
        owner_user_id: i64,
        request: CreateMedicationRequest,
    ) -> Result<Medication> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let medication = Medication {
            id: state.mint_id(),
            owner_user_id,
            family_id: request.family_id,
            name: request.name,
            dosage: request.dosage,
            schedules: request.schedules,
            remaining_amount: request.remaining_amount,
            refill_threshold: request.refill_threshold,
            refill_reminder: request.refill_reminder,
            created_at: now,
            updated_at: now,
        };
        state.medications.insert(medication.id, medication.clone());
        Ok(medication)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Medication>> {
        Ok(self.state.read().await.medications.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateMedicationRequest) -> Result<Medication> {
        let mut state = self.state.write().await;
        let medication = state
            .medications
            .get_mut(&id)
            .ok_or_else(|| not_found("medication", id))?;
        if let Some(name) = request.name {
            medication.name = name;
        }
        if let Some(dosage) = request.dosage {
            medication.dosage = Some(dosage);
        }
        if let Some(family_id) = request.family_id {
            medication.family_id = Some(family_id);
        }
        if let Some(schedules) = request.schedules {
            medication.schedules = schedules;
        }
        if let Some(remaining_amount) = request.remaining_amount {
            medication.remaining_amount = remaining_amount;
        }
        if let Some(refill_threshold) = request.refill_threshold {
            medication.refill_threshold = refill_threshold;
        }
        if let Some(refill_reminder) = request.refill_reminder {
            medication.refill_reminder = refill_reminder;
        }
        medication.updated_at = Utc::now();
        Ok(medication.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        state.medication_logs.remove(&id);
        Ok(state.medications.remove(&id).is_some())
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Medication>> {
        let state = self.state.read().await;
        let mut medications: Vec<Medication> = state
            .medications
            .values()
            .filter(|m| m.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        medications.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(medications)
    }

    async fn find_due_candidates(&self, owner_user_id: i64) -> Result<Vec<Medication>> {
        let mut medications = MedicationStore::find_for_owner(self, owner_user_id).await?;
        medications.retain(|m| m.has_active_schedule());
        Ok(medications)
    }

    async fn decrement_remaining(&self, id: i64) -> Result<Medication> {
        // Single write-lock section: read, floor, write is one atomic step
        let mut state = self.state.write().await;
        let medication = state
            .medications
            .get_mut(&id)
            .ok_or_else(|| not_found("medication", id))?;
        medication.remaining_amount = (medication.remaining_amount - 1).max(0);
        medication.updated_at = Utc::now();
        Ok(medication.clone())
    }

    async fn append_log(
        &self,
        medication_id: i64,
        timestamp: DateTime<Utc>,
        taken: bool,
        notes: Option<String>,
    ) -> Result<MedicationLog> {
        let mut state = self.state.write().await;
        if !state.medications.contains_key(&medication_id) {
            return Err(not_found("medication", medication_id));
        }
        let log = MedicationLog {
            id: state.mint_id(),
            medication_id,
            timestamp,
            taken,
            notes,
        };
        state
            .medication_logs
            .entry(medication_id)
            .or_default()
            .push(log.clone());
        Ok(log)
    }

    async fn find_logs(&self, medication_id: i64) -> Result<Vec<MedicationLog>> {
        let state = self.state.read().await;
        let mut logs = state
            .medication_logs
            .get(&medication_id)
            .cloned()
            .unwrap_or_default();
        logs.sort_by_key(|l| (std::cmp::Reverse(l.timestamp), std::cmp::Reverse(l.id)));
        Ok(logs)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        owner_user_id: i64,
        storage_key: String,
        request: CreateDocumentRequest,
    ) -> Result<Document> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let document = Document {
            id: state.mint_id(),
            owner_user_id,
            family_id: request.family_id,
            title: request.title,
            category: request.category,
            file_name: request.file_name,
            storage_key,
            content_type: request.content_type,
            expiry_date: request.expiry_date,
            is_shared: request.is_shared,
            created_at: now,
            updated_at: now,
        };
        state.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>> {
        Ok(self.state.read().await.documents.get(&id).cloned())
    }

    async fn update(&self, id: i64, request: UpdateDocumentRequest) -> Result<Document> {
        let mut state = self.state.write().await;
        let document = state
            .documents
            .get_mut(&id)
            .ok_or_else(|| not_found("document", id))?;
        if let Some(title) = request.title {
            document.title = title;
        }
        if let Some(category) = request.category {
            document.category = Some(category);
        }
        if let Some(file_name) = request.file_name {
            document.file_name = file_name;
        }
        if let Some(content_type) = request.content_type {
            document.content_type = Some(content_type);
        }
        if let Some(family_id) = request.family_id {
            document.family_id = Some(family_id);
        }
        if let Some(expiry_date) = request.expiry_date {
            document.expiry_date = Some(expiry_date);
        }
        if let Some(is_shared) = request.is_shared {
            document.is_shared = is_shared;
        }
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.documents.remove(&id).is_some())
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let mut documents: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        documents.sort_by_key(|d| (std::cmp::Reverse(d.created_at), std::cmp::Reverse(d.id)));
        Ok(documents)
    }

    async fn find_expiring(
        &self,
        owner_user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let mut documents: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.owner_user_id == owner_user_id)
            .filter(|d| {
                d.expiry_date
                    .map(|expiry| expiry >= from && expiry <= until)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        documents.sort_by_key(|d| (d.expiry_date, d.id));
        Ok(documents)
    }
}
