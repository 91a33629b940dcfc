//! Medication service
//!
//! CRUD plus the intake log. Logging an intake with `taken = true` decrements
//! the remaining amount through the store's atomic primitive so concurrent
//! logs can never drive the count below zero.

use tracing::{debug, info};

use crate::database::stores::Stores;
use crate::models::{
    CreateMedicationRequest, LogIntakeRequest, Medication, MedicationLog, Schedule,
    UpdateMedicationRequest,
};
use crate::services::auth::{ensure_owner, AccessPolicy, AuthContext};
use crate::utils::errors::{NestMateError, Result};

#[derive(Clone)]
pub struct MedicationService {
    stores: Stores,
    policy: AccessPolicy,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NestMateError::Validation(
            "medication name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_amounts(remaining: i32, threshold: i32) -> Result<()> {
    if remaining < 0 {
        return Err(NestMateError::Validation(
            "remaining amount must not be negative".to_string(),
        ));
    }
    if threshold < 0 {
        return Err(NestMateError::Validation(
            "refill threshold must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_schedules(schedules: &[Schedule]) -> Result<()> {
    for schedule in schedules {
        if let Some(day) = schedule.days_of_week.iter().find(|d| **d > 6) {
            return Err(NestMateError::Validation(format!(
                "schedule day {day} is outside 0..=6"
            )));
        }
    }
    Ok(())
}

impl MedicationService {
    pub fn new(stores: Stores, policy: AccessPolicy) -> Self {
        Self { stores, policy }
    }

    async fn load(&self, id: i64) -> Result<Medication> {
        self.stores
            .medications
            .find_by_id(id)
            .await?
            .ok_or(NestMateError::NotFound {
                resource: "medication",
                id,
            })
    }

    pub async fn create_medication(
        &self,
        ctx: &AuthContext,
        request: CreateMedicationRequest,
    ) -> Result<Medication> {
        validate_name(&request.name)?;
        validate_amounts(request.remaining_amount, request.refill_threshold)?;
        validate_schedules(&request.schedules)?;
        if let Some(family_id) = request.family_id {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let medication = self.stores.medications.create(ctx.user_id, request).await?;
        info!(
            medication_id = medication.id,
            user_id = ctx.user_id,
            "Medication created"
        );
        Ok(medication)
    }

    pub async fn get_medication(&self, ctx: &AuthContext, id: i64) -> Result<Medication> {
        let medication = self.load(id).await?;
        self.policy.ensure_readable(&medication, ctx.user_id).await?;
        Ok(medication)
    }

    pub async fn update_medication(
        &self,
        ctx: &AuthContext,
        id: i64,
        request: UpdateMedicationRequest,
    ) -> Result<Medication> {
        let medication = self.load(id).await?;
        ensure_owner(&medication, ctx.user_id, "update")?;

        if let Some(name) = &request.name {
            validate_name(name)?;
        }
        validate_amounts(
            request.remaining_amount.unwrap_or(medication.remaining_amount),
            request.refill_threshold.unwrap_or(medication.refill_threshold),
        )?;
        if let Some(schedules) = &request.schedules {
            validate_schedules(schedules)?;
        }
        if let Some(family_id) = request.family_id.or(medication.family_id) {
            self.policy.ensure_member(family_id, ctx.user_id).await?;
        }

        let medication = self.stores.medications.update(id, request).await?;
        info!(medication_id = id, user_id = ctx.user_id, "Medication updated");
        Ok(medication)
    }

    pub async fn delete_medication(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        let medication = self.load(id).await?;
        ensure_owner(&medication, ctx.user_id, "delete")?;

        self.stores.medications.delete(id).await?;
        info!(medication_id = id, user_id = ctx.user_id, "Medication deleted");
        Ok(())
    }

    pub async fn list_medications(&self, ctx: &AuthContext) -> Result<Vec<Medication>> {
        self.stores.medications.find_for_owner(ctx.user_id).await
    }

    /// Record an intake. Owner-only: family read access does not extend to
    /// writing someone else's log.
    pub async fn log_intake(
        &self,
        ctx: &AuthContext,
        medication_id: i64,
        request: LogIntakeRequest,
    ) -> Result<MedicationLog> {
        let medication = self.load(medication_id).await?;
        ensure_owner(&medication, ctx.user_id, "log intake for")?;

        let timestamp = request.timestamp.unwrap_or_else(chrono::Utc::now);
        let log = self
            .stores
            .medications
            .append_log(medication_id, timestamp, request.taken, request.notes)
            .await?;

        if request.taken {
            let updated = self.stores.medications.decrement_remaining(medication_id).await?;
            debug!(
                medication_id,
                remaining = updated.remaining_amount,
                "Inventory decremented"
            );
        }

        info!(
            medication_id,
            user_id = ctx.user_id,
            taken = request.taken,
            "Intake logged"
        );
        Ok(log)
    }

    /// Log visibility follows the medication's read access
    pub async fn list_logs(&self, ctx: &AuthContext, medication_id: i64) -> Result<Vec<MedicationLog>> {
        let medication = self.load(medication_id).await?;
        self.policy.ensure_readable(&medication, ctx.user_id).await?;
        self.stores.medications.find_logs(medication_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateUserRequest, UserRole};
    use crate::utils::errors::ErrorKind;

    async fn setup() -> (MedicationService, Stores, i64, i64) {
        let stores = Stores::memory();
        let policy = AccessPolicy::new(stores.families.clone());
        let service = MedicationService::new(stores.clone(), policy);
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

    fn request(name: &str) -> CreateMedicationRequest {
        CreateMedicationRequest {
            name: name.to_string(),
            dosage: Some("200mg".to_string()),
            family_id: None,
            schedules: vec![Schedule {
                time: "08:00".to_string(),
                days_of_week: vec![1, 3, 5],
                active: true,
            }],
            remaining_amount: 10,
            refill_threshold: 3,
            refill_reminder: true,
        }
    }

    #[tokio::test]
    async fn test_create_medication_validations() {
        let (service, _, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);

        let err = service.create_medication(&ctx, request(" ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut negative = request("Ibuprofen");
        negative.remaining_amount = -1;
        let err = service.create_medication(&ctx, negative).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut bad_day = request("Ibuprofen");
        bad_day.schedules[0].days_of_week = vec![7];
        let err = service.create_medication(&ctx, bad_day).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_taken_log_decrements_skipped_log_does_not() {
        let (service, _, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);
        let medication = service.create_medication(&ctx, request("Ibuprofen")).await.unwrap();

        service
            .log_intake(
                &ctx,
                medication.id,
                LogIntakeRequest { taken: true, notes: None, timestamp: None },
            )
            .await
            .unwrap();
        service
            .log_intake(
                &ctx,
                medication.id,
                LogIntakeRequest {
                    taken: false,
                    notes: Some("skipped, felt fine".to_string()),
                    timestamp: None,
                },
            )
            .await
            .unwrap();

        let fetched = service.get_medication(&ctx, medication.id).await.unwrap();
        assert_eq!(fetched.remaining_amount, 9);

        let logs = service.list_logs(&ctx, medication.id).await.unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_taken_logs_floor_at_zero() {
        let (service, _, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);

        let mut req = request("Ibuprofen");
        req.remaining_amount = 2;
        let medication = service.create_medication(&ctx, req).await.unwrap();

        for _ in 0..5 {
            service
                .log_intake(
                    &ctx,
                    medication.id,
                    LogIntakeRequest { taken: true, notes: None, timestamp: None },
                )
                .await
                .unwrap();
        }

        let fetched = service.get_medication(&ctx, medication.id).await.unwrap();
        assert_eq!(fetched.remaining_amount, 0);
    }

    #[tokio::test]
    async fn test_log_intake_is_owner_only() {
        let (service, _, owner, other) = setup().await;
        let medication = service
            .create_medication(&AuthContext::new(owner), request("Ibuprofen"))
            .await
            .unwrap();

        let err = service
            .log_intake(
                &AuthContext::new(other),
                medication.id,
                LogIntakeRequest { taken: true, notes: None, timestamp: None },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_update_replaces_schedule_list_wholesale() {
        let (service, _, owner, _) = setup().await;
        let ctx = AuthContext::new(owner);
        let medication = service.create_medication(&ctx, request("Ibuprofen")).await.unwrap();

        let update = UpdateMedicationRequest {
            schedules: Some(vec![Schedule {
                time: "21:00".to_string(),
                days_of_week: vec![0, 6],
                active: true,
            }]),
            ..Default::default()
        };
        let updated = service.update_medication(&ctx, medication.id, update).await.unwrap();
        assert_eq!(updated.schedules.len(), 1);
        assert_eq!(updated.schedules[0].time, "21:00");
    }
}
