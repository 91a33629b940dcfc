//! Medication repository implementation
//!
//! Inventory decrements go through a single conditional UPDATE so concurrent
//! intake logs can never drive `remaining_amount` below zero.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::stores::MedicationStore;
use crate::models::{
    CreateMedicationRequest, Medication, MedicationLog, Schedule, UpdateMedicationRequest,
};
use crate::utils::errors::{NestMateError, Result};

#[derive(Debug, sqlx::FromRow)]
struct MedicationRow {
    id: i64,
    owner_user_id: i64,
    family_id: Option<i64>,
    name: String,
    dosage: Option<String>,
    schedules: Json<Vec<Schedule>>,
    remaining_amount: i32,
    refill_threshold: i32,
    refill_reminder: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MedicationRow> for Medication {
    fn from(row: MedicationRow) -> Self {
        Medication {
            id: row.id,
            owner_user_id: row.owner_user_id,
            family_id: row.family_id,
            name: row.name,
            dosage: row.dosage,
            schedules: row.schedules.0,
            remaining_amount: row.remaining_amount,
            refill_threshold: row.refill_threshold,
            refill_reminder: row.refill_reminder,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct MedicationRepository {
    pool: PgPool,
}

impl MedicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicationStore for MedicationRepository {
    async fn create(
        &self,
        owner_user_id: i64,
        request: CreateMedicationRequest,
    ) -> Result<Medication> {
        let row = sqlx::query_as::<_, MedicationRow>(
            r#"
            INSERT INTO medications (owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at
            "#,
        )
        .bind(owner_user_id)
        .bind(request.family_id)
        .bind(request.name)
        .bind(request.dosage)
        .bind(Json(request.schedules))
        .bind(request.remaining_amount)
        .bind(request.refill_threshold)
        .bind(request.refill_reminder)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Medication>> {
        let row = sqlx::query_as::<_, MedicationRow>(
            "SELECT id, owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at FROM medications WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Medication::from))
    }

    async fn update(&self, id: i64, request: UpdateMedicationRequest) -> Result<Medication> {
        let row = sqlx::query_as::<_, MedicationRow>(
            r#"
            UPDATE medications
            SET name = COALESCE($2, name),
                dosage = COALESCE($3, dosage),
                family_id = COALESCE($4, family_id),
                schedules = COALESCE($5, schedules),
                remaining_amount = COALESCE($6, remaining_amount),
                refill_threshold = COALESCE($7, refill_threshold),
                refill_reminder = COALESCE($8, refill_reminder),
                updated_at = $9
            WHERE id = $1
            RETURNING id, owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.name)
        .bind(request.dosage)
        .bind(request.family_id)
        .bind(request.schedules.map(Json))
        .bind(request.remaining_amount)
        .bind(request.refill_threshold)
        .bind(request.refill_reminder)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound {
            resource: "medication",
            id,
        })?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM medications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_for_owner(&self, owner_user_id: i64) -> Result<Vec<Medication>> {
        let rows = sqlx::query_as::<_, MedicationRow>(
            r#"
            SELECT id, owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at
            FROM medications
            WHERE owner_user_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Medication::from).collect())
    }

    async fn find_due_candidates(&self, owner_user_id: i64) -> Result<Vec<Medication>> {
        // JSONB containment: keeps medications with at least one active schedule
        let rows = sqlx::query_as::<_, MedicationRow>(
            r#"
            SELECT id, owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at
            FROM medications
            WHERE owner_user_id = $1 AND schedules @> '[{"active": true}]'::jsonb
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Medication::from).collect())
    }

    async fn decrement_remaining(&self, id: i64) -> Result<Medication> {
        let row = sqlx::query_as::<_, MedicationRow>(
            r#"
            UPDATE medications
            SET remaining_amount = GREATEST(remaining_amount - 1, 0), updated_at = $2
            WHERE id = $1
            RETURNING id, owner_user_id, family_id, name, dosage, schedules, remaining_amount, refill_threshold, refill_reminder, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NestMateError::NotFound {
            resource: "medication",
            id,
        })?;

        Ok(row.into())
    }

    async fn append_log(
        &self,
        medication_id: i64,
        timestamp: DateTime<Utc>,
        taken: bool,
        notes: Option<String>,
    ) -> Result<MedicationLog> {
        let log = sqlx::query_as::<_, MedicationLog>(
            r#"
            INSERT INTO medication_logs (medication_id, timestamp, taken, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, medication_id, timestamp, taken, notes
            "#,
        )
        .bind(medication_id)
        .bind(timestamp)
        .bind(taken)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    async fn find_logs(&self, medication_id: i64) -> Result<Vec<MedicationLog>> {
        let logs = sqlx::query_as::<_, MedicationLog>(
            r#"
            SELECT id, medication_id, timestamp, taken, notes
            FROM medication_logs
            WHERE medication_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(medication_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
