//! Medication tracking behavior
//!
//! Intake logging, the inventory floor under concurrent logs, and the
//! schedule arithmetic feeding the dashboard's due-today list.

mod helpers;

use futures::future::join_all;
use helpers::*;
use proptest::prelude::*;

use NestMate::models::{LogIntakeRequest, Schedule, UpdateMedicationRequest};

fn intake(taken: bool) -> LogIntakeRequest {
    LogIntakeRequest { taken, notes: None, timestamp: None }
}

#[tokio::test]
async fn test_intake_history_is_newest_first() {
    let app = TestApp::new();
    let alice = app.user("Alice").await;
    let medications = &app.services.medication_service;

    let medication = medications
        .create_medication(&ctx(alice), medication_request("Ibuprofen", vec![3], 10))
        .await
        .unwrap();

    let base = wednesday_noon();
    for offset in [0, 1, 2] {
        medications
            .log_intake(
                &ctx(alice),
                medication.id,
                LogIntakeRequest {
                    taken: true,
                    notes: Some(format!("dose {offset}")),
                    timestamp: Some(base + chrono::Duration::hours(offset)),
                },
            )
            .await
            .unwrap();
    }

    let logs = medications.list_logs(&ctx(alice), medication.id).await.unwrap();
    let notes: Vec<&str> = logs.iter().filter_map(|l| l.notes.as_deref()).collect();
    assert_eq!(notes, vec!["dose 2", "dose 1", "dose 0"]);
}

#[tokio::test]
async fn test_concurrent_taken_logs_never_go_negative() {
    let app = TestApp::new();
    let alice = app.user("Alice").await;
    let medications = &app.services.medication_service;

    let medication = medications
        .create_medication(&ctx(alice), medication_request("Ibuprofen", vec![3], 4))
        .await
        .unwrap();

    // Ten concurrent "taken" logs against 4 remaining doses
    let calls = (0..10).map(|_| {
        let service = medications.clone();
        let ctx = ctx(alice);
        let id = medication.id;
        async move { service.log_intake(&ctx, id, intake(true)).await }
    });
    for result in join_all(calls).await {
        result.unwrap();
    }

    let fetched = medications.get_medication(&ctx(alice), medication.id).await.unwrap();
    assert_eq!(fetched.remaining_amount, 0);
    assert_eq!(
        medications.list_logs(&ctx(alice), medication.id).await.unwrap().len(),
        10
    );
}

#[tokio::test]
async fn test_low_stock_tracks_threshold_and_reminder() {
    let app = TestApp::new();
    let alice = app.user("Alice").await;
    let medications = &app.services.medication_service;

    // threshold 3, starting just above it
    let medication = medications
        .create_medication(&ctx(alice), medication_request("Ibuprofen", vec![3], 4))
        .await
        .unwrap();
    assert!(!medication.is_low_stock());

    medications
        .log_intake(&ctx(alice), medication.id, intake(true))
        .await
        .unwrap();
    let fetched = medications.get_medication(&ctx(alice), medication.id).await.unwrap();
    assert!(fetched.is_low_stock());

    // Disabling the reminder silences the alert at any level
    medications
        .update_medication(
            &ctx(alice),
            medication.id,
            UpdateMedicationRequest { refill_reminder: Some(false), ..Default::default() },
        )
        .await
        .unwrap();
    let fetched = medications.get_medication(&ctx(alice), medication.id).await.unwrap();
    assert!(!fetched.is_low_stock());
}

proptest! {
    // due_on looks only at active schedules containing the exact weekday
    #[test]
    fn prop_due_on_agrees_with_the_day_sets(
        day_sets in proptest::collection::vec(
            (proptest::collection::vec(0u8..7, 0..8), proptest::bool::ANY),
            0..5,
        ),
        weekday in 0u8..7,
    ) {
        let schedules: Vec<Schedule> = day_sets
            .iter()
            .map(|(days, active)| Schedule {
                time: "08:00".to_string(),
                days_of_week: days.clone(),
                active: *active,
            })
            .collect();
        let expected = day_sets
            .iter()
            .any(|(days, active)| *active && days.contains(&weekday));

        let medication = NestMate::models::Medication {
            id: 1,
            owner_user_id: 1,
            family_id: None,
            name: "X".to_string(),
            dosage: None,
            schedules,
            remaining_amount: 10,
            refill_threshold: 0,
            refill_reminder: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        prop_assert_eq!(medication.due_on(weekday), expected);
    }
}
