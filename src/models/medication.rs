//! Medication model
//!
//! Medications carry their reminder schedules and inventory state. The
//! "fires today" and "low stock" predicates evaluated by the dashboard live
//! here as pure methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub owner_user_id: i64,
    pub family_id: Option<i64>,
    pub name: String,
    pub dosage: Option<String>,
    pub schedules: Vec<Schedule>,
    pub remaining_amount: i32,
    pub refill_threshold: i32,
    pub refill_reminder: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recurring reminder slot. `days_of_week` uses 0=Sunday..6=Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub time: String,
    pub days_of_week: Vec<u8>,
    pub active: bool,
}

impl Schedule {
    /// An inactive schedule never fires, whatever its day set says
    pub fn fires_on(&self, weekday: u8) -> bool {
        self.active && self.days_of_week.contains(&weekday)
    }
}

impl Medication {
    /// A medication is due when any of its schedules fires on the weekday
    pub fn due_on(&self, weekday: u8) -> bool {
        self.schedules.iter().any(|s| s.fires_on(weekday))
    }

    pub fn has_active_schedule(&self) -> bool {
        self.schedules.iter().any(|s| s.active)
    }

    /// Low stock requires the reminder to be enabled; without it the
    /// remaining amount is never alerted on
    pub fn is_low_stock(&self) -> bool {
        self.refill_reminder && self.remaining_amount <= self.refill_threshold
    }
}

/// Append-only intake log entry; a `taken` entry decrements the remaining
/// amount by exactly one, floored at zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicationLog {
    pub id: i64,
    pub medication_id: i64,
    pub timestamp: DateTime<Utc>,
    pub taken: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicationRequest {
    pub name: String,
    pub dosage: Option<String>,
    pub family_id: Option<i64>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub remaining_amount: i32,
    #[serde(default)]
    pub refill_threshold: i32,
    #[serde(default)]
    pub refill_reminder: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub family_id: Option<i64>,
    pub schedules: Option<Vec<Schedule>>,
    pub remaining_amount: Option<i32>,
    pub refill_threshold: Option<i32>,
    pub refill_reminder: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogIntakeRequest {
    pub taken: bool,
    pub notes: Option<String>,
    /// Defaults to the current time when absent
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn medication(schedules: Vec<Schedule>, remaining: i32, threshold: i32, reminder: bool) -> Medication {
        let now = Utc::now();
        Medication {
            id: 1,
            owner_user_id: 1,
            family_id: None,
            name: "Ibuprofen".to_string(),
            dosage: Some("200mg".to_string()),
            schedules,
            remaining_amount: remaining,
            refill_threshold: threshold,
            refill_reminder: reminder,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_inactive_schedule_never_fires() {
        let schedule = Schedule {
            time: "08:00".to_string(),
            days_of_week: vec![0, 1, 2, 3, 4, 5, 6],
            active: false,
        };
        for day in 0..7u8 {
            assert!(!schedule.fires_on(day));
        }
    }

    #[test]
    fn test_due_on_matches_any_schedule() {
        let med = medication(
            vec![
                Schedule { time: "08:00".to_string(), days_of_week: vec![1, 3, 5], active: true },
                Schedule { time: "20:00".to_string(), days_of_week: vec![2], active: false },
            ],
            10,
            5,
            true,
        );
        assert!(med.due_on(3));
        assert!(!med.due_on(2));
        assert!(!med.due_on(0));
    }

    #[test]
    fn test_low_stock_requires_reminder() {
        assert!(medication(vec![], 3, 5, true).is_low_stock());
        assert!(medication(vec![], 5, 5, true).is_low_stock());
        assert!(!medication(vec![], 6, 5, true).is_low_stock());
        assert!(!medication(vec![], 0, 5, false).is_low_stock());
    }

    proptest! {
        #[test]
        fn prop_inactive_schedules_never_fire(days in proptest::collection::vec(0u8..7, 0..8), day in 0u8..7) {
            let schedule = Schedule { time: "08:00".to_string(), days_of_week: days, active: false };
            prop_assert!(!schedule.fires_on(day));
        }

        #[test]
        fn prop_low_stock_off_without_reminder(remaining in -5i32..100, threshold in -5i32..100) {
            let med = medication(vec![], remaining, threshold, false);
            prop_assert!(!med.is_low_stock());
        }
    }
}
