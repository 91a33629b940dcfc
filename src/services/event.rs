//! Event service

use tracing::info;

use crate::database::stores::Stores;
use crate::models::{CreateEventRequest, Event, UpdateEventRequest};
use crate::services::auth::{ensure_owner, AccessPolicy, AuthContext};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct EventService {
    stores: Stores,
    policy: AccessPolicy,
}

impl EventService {
    pub fn new(stores: Stores, policy: AccessPolicy) -> Self {
        Self { stores, policy }
    }

    async fn load(&self, id: i64) -> Result<Event> {
        self.stores
            .events
            .find_by_id(id)
            .await?
            .ok_or(NestMateError::NotFound { resource: "event", id })
    }

    pub async fn create_event(&self, ctx: &AuthContext, request: CreateEventRequest) -> Result<Event> {
        if request.title.trim().is_empty() {
            return Err(NestMateError::Validation(
                "event title must not be empty".to_string(),
            ));
        }
        if let Some(end) = request.end_time {
            if end < request.start_time {
                return Err(NestMateError::Validation(
                    "event end time must not precede its start".to_string(),
                ));
            }
        }
        if let Some(family_id) = request.family_id {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let event = self.stores.events.create(ctx.user_id, request).await?;
        info!(event_id = event.id, user_id = ctx.user_id, "Event created");
        Ok(event)
    }

    pub async fn get_event(&self, ctx: &AuthContext, id: i64) -> Result<Event> {
        let event = self.load(id).await?;
        self.policy.ensure_readable(&event, ctx.user_id).await?;
        Ok(event)
    }

    pub async fn update_event(
        &self,
        ctx: &AuthContext,
        id: i64,
        request: UpdateEventRequest,
    ) -> Result<Event> {
        let event = self.load(id).await?;
        ensure_owner(&event, ctx.user_id, "update")?;

        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(NestMateError::Validation(
                    "event title must not be empty".to_string(),
                ));
            }
        }
        let start = request.start_time.unwrap_or(event.start_time);
        if let Some(end) = request.end_time.or(event.end_time) {
            if end < start {
                return Err(NestMateError::Validation(
                    "event end time must not precede its start".to_string(),
                ));
            }
        }
        // Membership is re-validated whenever the merged update still
        // references a family, even if this call does not change it
        if let Some(family_id) = request.family_id.or(event.family_id) {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let event = self.stores.events.update(id, request).await?;
        info!(event_id = id, user_id = ctx.user_id, "Event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let event = self.load(id).await?;
        ensure_owner(&event, ctx.user_id, "delete")?;

        self.stores.events.delete(id).await?;
        info!(event_id = id, user_id = ctx.user_id, "Event deleted");
        Ok(())
    }

    /// Events the user owns or has been granted read on, ascending by start
    pub async fn list_events(&self, ctx: &AuthContext) -> Result<Vec<Event>> {
        self.stores.events.find_for_user(ctx.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateFamilyRequest, CreateUserRequest, UserRole};
    use crate::utils::errors::ErrorKind;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    async fn setup() -> (EventService, Stores, i64, i64) {
        let stores = Stores::memory();
        let policy = AccessPolicy::new(stores.families.clone());
        let service = EventService::new(stores.clone(), policy);
        let owner = stores
            .users
            .create(CreateUserRequest {
                display_name: "Owner".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        let other = stores
            .users
            .create(CreateUserRequest {
                display_name: "Other".to_string(),
                role: UserRole::Parent,
            })
            .await
            .unwrap();
        (service, stores, owner.id, other.id)
    }

    fn request(title: &str) -> CreateEventRequest {
        CreateEventRequest {
            title: title.to_string(),
            description: None,
            start_time: Utc::now() + Duration::hours(1),
            end_time: None,
            location: None,
            family_id: None,
            shared_with: vec![],
            is_shared: false,
        }
    }

    #[tokio::test]
    async fn test_create_event_validates_fields() {
        let (service, _, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);

        let err = service.create_event(&ctx, request("  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut backwards = request("Dentist");
        backwards.end_time = Some(backwards.start_time - Duration::hours(2));
        let err = service.create_event(&ctx, backwards).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_event_rejects_foreign_family() {
        let (service, stores, owner, other) = setup().await;

        // A family the acting user is not a member of
        let family = stores
            .families
            .create(CreateFamilyRequest { name: "F".to_string() }, other)
            .await
            .unwrap();

        let mut req = request("Dentist");
        req.family_id = Some(family.id);
        let err = service
            .create_event(&AuthContext::new(owner), req)
            .await
            .unwrap_err();
        assert_matches!(err, NestMateError::InvalidMembership { .. });
    }

    #[tokio::test]
    async fn test_shared_reader_can_get_but_not_touch() {
        let (service, _, owner, other) = setup().await;

        let mut req = request("Dentist");
        req.shared_with = vec![other];
        let event = service.create_event(&AuthContext::new(owner), req).await.unwrap();

        let reader = AuthContext::new(other);
        assert!(service.get_event(&reader, event.id).await.is_ok());

        let err = service
            .update_event(&reader, event.id, UpdateEventRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = service.delete_event(&reader, event.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_update_rechecks_retained_family_reference() {
        let (service, stores, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);

        let family = stores
            .families
            .create(CreateFamilyRequest { name: "F".to_string() }, owner)
            .await
            .unwrap();
        let mut req = request("Dentist");
        req.family_id = Some(family.id);
        let event = service.create_event(&ctx, req).await.unwrap();

        // Drop the owner's membership out from under the event
        let mut family = stores.families.find_by_id(family.id).await.unwrap().unwrap();
        family.remove_member(owner);
        stores.families.save(&family).await.unwrap();

        let err = service
            .update_event(&ctx, event.id, UpdateEventRequest::default())
            .await
            .unwrap_err();
        assert_matches!(err, NestMateError::InvalidMembership { .. });
    }
}
