//! Today-view aggregation
//!
//! One call assembles everything the home screen needs: upcoming and
//! same-day events, urgent shopping lists, today's meal plan, medications
//! due today, low-stock medications and documents about to expire. The six
//! store fetches run concurrently; a single failed fetch abandons the whole
//! aggregation rather than serving a silently incomplete view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::database::stores::Stores;
use crate::models::{Document, Event, Family, Meal, Medication, ShoppingList};
use crate::services::auth::AuthContext;
use crate::utils::errors::{NestMateError, Result};
use crate::utils::helpers::{forward_window, in_day_window, today_window, weekday_index};
use crate::utils::logging::log_dashboard_fetch_failure;

/// The aggregated view, ready for serialization.
///
/// `upcoming_events` is capped and ascending by start time; `today_events`
/// is its same-day subset and keeps that order. `generated_at` echoes the
/// reference time the windows were derived from.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub upcoming_events: Vec<Event>,
    pub today_events: Vec<Event>,
    pub urgent_shopping_lists: Vec<ShoppingList>,
    pub today_meals: Vec<Meal>,
    pub today_medications: Vec<Medication>,
    pub low_stock_medications: Vec<Medication>,
    pub expiring_documents: Vec<Document>,
    pub families: Vec<Family>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct DashboardService {
    stores: Stores,
    config: DashboardConfig,
}

fn fetch_failed(user_id: i64, category: &'static str, error: NestMateError) -> NestMateError {
    log_dashboard_fetch_failure(user_id, category, &error.to_string());
    NestMateError::Dependency {
        category,
        source: Box::new(error),
    }
}

impl DashboardService {
    pub fn new(stores: Stores, config: DashboardConfig) -> Self {
        Self { stores, config }
    }

    /// Build the dashboard for `ctx` as of `now`.
    ///
    /// All windows derive from the caller's reference time: today is the
    /// half-open day around `now`, the event window spans the next
    /// `upcoming_window_days` days (closed), documents the next
    /// `document_expiry_window_days` days.
    pub async fn build_dashboard(
        &self,
        ctx: &AuthContext,
        now: DateTime<Utc>,
    ) -> Result<DashboardView> {
        let user_id = ctx.user_id;
        let (today_from, today_until) = today_window(now);
        let (week_from, week_until) = forward_window(now, self.config.upcoming_window_days);
        let (expiry_from, expiry_until) =
            forward_window(now, self.config.document_expiry_window_days);
        let weekday = weekday_index(now);

        debug!(user_id, weekday, "Building dashboard");

        let (events, urgent_lists, today_meals, medications, documents, families) = futures::try_join!(
            async {
                self.stores
                    .events
                    .find_visible_in_window(user_id, week_from, week_until)
                    .await
                    .map_err(|e| fetch_failed(user_id, "events", e))
            },
            async {
                self.stores
                    .shopping_lists
                    .find_urgent_for_user(user_id)
                    .await
                    .map_err(|e| fetch_failed(user_id, "shopping_lists", e))
            },
            async {
                self.stores
                    .meals
                    .find_for_owner_in_window(user_id, today_from, today_until)
                    .await
                    .map_err(|e| fetch_failed(user_id, "meals", e))
            },
            async {
                self.stores
                    .medications
                    .find_due_candidates(user_id)
                    .await
                    .map_err(|e| fetch_failed(user_id, "medications", e))
            },
            async {
                self.stores
                    .documents
                    .find_expiring(user_id, expiry_from, expiry_until)
                    .await
                    .map_err(|e| fetch_failed(user_id, "documents", e))
            },
            async {
                self.stores
                    .families
                    .find_for_user(user_id)
                    .await
                    .map_err(|e| fetch_failed(user_id, "families", e))
            },
        )?;

        let mut upcoming_events = events;
        upcoming_events.truncate(self.config.upcoming_events_limit);
        // Same-day subset of the already capped list, so an event excluded
        // by the cap never resurfaces here
        let today_events: Vec<Event> = upcoming_events
            .iter()
            .filter(|e| in_day_window(e.start_time, today_from, today_until))
            .cloned()
            .collect();

        let mut urgent_shopping_lists = urgent_lists;
        urgent_shopping_lists.truncate(self.config.urgent_lists_limit);

        let today_medications: Vec<Medication> = medications
            .iter()
            .filter(|m| m.due_on(weekday))
            .cloned()
            .collect();
        let low_stock_medications: Vec<Medication> = medications
            .into_iter()
            .filter(|m| m.is_low_stock())
            .collect();

        let mut expiring_documents = documents;
        expiring_documents.truncate(self.config.expiring_documents_limit);

        info!(
            user_id,
            upcoming_events = upcoming_events.len(),
            today_events = today_events.len(),
            urgent_lists = urgent_shopping_lists.len(),
            today_meals = today_meals.len(),
            due_medications = today_medications.len(),
            expiring_documents = expiring_documents.len(),
            "Dashboard assembled"
        );

        Ok(DashboardView {
            upcoming_events,
            today_events,
            urgent_shopping_lists,
            today_meals,
            today_medications,
            low_stock_medications,
            expiring_documents,
            families,
            generated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::stores::EventStore;
    use crate::models::{
        CreateEventRequest, CreateMealRequest, CreateMedicationRequest, CreateUserRequest,
        MealSlot, Schedule, UpdateEventRequest, UserRole,
    };
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    // 2024-03-13 is a Wednesday: weekday index 3
    fn wednesday_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap()
    }

    async fn setup() -> (DashboardService, Stores, i64) {
        let stores = Stores::memory();
        let service = DashboardService::new(stores.clone(), DashboardConfig::default());
        let user = stores
            .users
            .create(CreateUserRequest {
                display_name: "Dana".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        (service, stores, user.id)
    }

    async fn seed_event(stores: &Stores, owner: i64, title: &str, start: DateTime<Utc>) {
        stores
            .events
            .create(
                owner,
                CreateEventRequest {
                    title: title.to_string(),
                    description: None,
                    start_time: start,
                    end_time: None,
                    location: None,
                    family_id: None,
                    shared_with: vec![],
                    is_shared: false,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_today_events_are_subset_of_upcoming() {
        let (service, stores, user) = setup().await;
        let now = wednesday_noon();

        seed_event(&stores, user, "breakfast run", now - Duration::hours(5)).await;
        seed_event(&stores, user, "dentist", now + Duration::hours(3)).await;
        seed_event(&stores, user, "football", now + Duration::days(2)).await;
        seed_event(&stores, user, "far away", now + Duration::days(20)).await;

        let view = service
            .build_dashboard(&AuthContext::new(user), now)
            .await
            .unwrap();

        let upcoming: Vec<&str> = view.upcoming_events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(upcoming, vec!["breakfast run", "dentist", "football"]);

        let today: Vec<&str> = view.today_events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(today, vec!["breakfast run", "dentist"]);
        assert_eq!(view.generated_at, now);
    }

    #[tokio::test]
    async fn test_event_cap_applies_before_the_today_subset() {
        let (service, stores, user) = setup().await;
        let now = wednesday_noon();

        // Twelve same-day events; the cap keeps the ten earliest
        for hour in 0..12 {
            let start = now - Duration::hours(11) + Duration::hours(hour);
            seed_event(&stores, user, &format!("slot {hour}"), start).await;
        }

        let view = service
            .build_dashboard(&AuthContext::new(user), now)
            .await
            .unwrap();
        assert_eq!(view.upcoming_events.len(), 10);
        assert_eq!(view.today_events.len(), 10);
        assert_eq!(view.upcoming_events[0].title, "slot 0");
        assert_eq!(view.upcoming_events[9].title, "slot 9");
    }

    #[tokio::test]
    async fn test_medication_filters_use_the_reference_weekday() {
        let (service, stores, user) = setup().await;
        let now = wednesday_noon();

        let schedule = |days: Vec<u8>, active: bool| Schedule {
            time: "08:00".to_string(),
            days_of_week: days,
            active,
        };
        let medication = |name: &str, schedules: Vec<Schedule>, remaining: i32| {
            CreateMedicationRequest {
                name: name.to_string(),
                dosage: None,
                family_id: None,
                schedules,
                remaining_amount: remaining,
                refill_threshold: 5,
                refill_reminder: true,
            }
        };

        // Due today and low on stock
        stores
            .medications
            .create(user, medication("wednesday-low", vec![schedule(vec![3], true)], 2))
            .await
            .unwrap();
        // Due on Tuesdays only, plenty left
        stores
            .medications
            .create(user, medication("tuesday-full", vec![schedule(vec![2], true)], 90))
            .await
            .unwrap();
        // Low on stock but no active schedule: not a due candidate at all
        stores
            .medications
            .create(user, medication("paused-low", vec![schedule(vec![3], false)], 1))
            .await
            .unwrap();

        let view = service
            .build_dashboard(&AuthContext::new(user), now)
            .await
            .unwrap();

        let due: Vec<&str> = view.today_medications.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(due, vec!["wednesday-low"]);
        let low: Vec<&str> = view
            .low_stock_medications
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(low, vec!["wednesday-low"]);
    }

    #[tokio::test]
    async fn test_today_meals_use_the_half_open_day() {
        let (service, stores, user) = setup().await;
        let now = wednesday_noon();

        let meal = |offset: chrono::Duration, slot: MealSlot| CreateMealRequest {
            date: now + offset,
            slot,
            family_id: None,
            recipe_id: None,
            notes: None,
        };
        stores
            .meals
            .create(user, meal(Duration::hours(-4), MealSlot::Breakfast))
            .await
            .unwrap();
        stores
            .meals
            .create(user, meal(Duration::hours(7), MealSlot::Dinner))
            .await
            .unwrap();
        stores
            .meals
            .create(user, meal(Duration::days(1), MealSlot::Lunch))
            .await
            .unwrap();

        let view = service
            .build_dashboard(&AuthContext::new(user), now)
            .await
            .unwrap();
        assert_eq!(view.today_meals.len(), 2);
    }

    struct FailingEvents;

    #[async_trait]
    impl EventStore for FailingEvents {
        async fn create(&self, _: i64, _: CreateEventRequest) -> Result<Event> {
            Err(NestMateError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<Event>> {
            Err(NestMateError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn update(&self, _: i64, _: UpdateEventRequest) -> Result<Event> {
            Err(NestMateError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn delete(&self, _: i64) -> Result<bool> {
            Err(NestMateError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_for_user(&self, _: i64) -> Result<Vec<Event>> {
            Err(NestMateError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_visible_in_window(
            &self,
            _: i64,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<Vec<Event>> {
            Err(NestMateError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_abandons_the_aggregation() {
        let (_, stores, user) = setup().await;
        let mut broken = stores.clone();
        broken.events = Arc::new(FailingEvents);
        let service = DashboardService::new(broken, DashboardConfig::default());

        let err = service
            .build_dashboard(&AuthContext::new(user), wednesday_noon())
            .await
            .unwrap_err();
        assert_matches!(err, NestMateError::Dependency { category: "events", .. });
    }
}
