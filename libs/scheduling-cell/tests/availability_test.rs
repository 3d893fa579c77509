use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use scheduling_cell::models::{SchedulingError, SlotDecision};
use scheduling_cell::services::AvailabilityService;
use shared_models::appointment::AppointmentStatus;
use shared_utils::test_utils::{self, seeded_store};

fn at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 4, hour, minute, 0).unwrap()
}

#[tokio::test]
async fn empty_calendar_is_available() {
    let fixtures = seeded_store();
    let service = AvailabilityService::new(fixtures.store.clone());

    let decision = service
        .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 0), 30, None)
        .await
        .unwrap();
    assert_eq!(decision, SlotDecision::Available);
}

#[tokio::test]
async fn non_positive_durations_fail_before_any_lookup() {
    let fixtures = seeded_store();
    let service = AvailabilityService::new(fixtures.store.clone());

    assert_matches!(
        service
            .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 0), 0, None)
            .await
            .unwrap_err(),
        SchedulingError::InvalidDuration(0)
    );
    assert_matches!(
        service
            .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 0), -15, None)
            .await
            .unwrap_err(),
        SchedulingError::InvalidDuration(-15)
    );
}

#[tokio::test]
async fn unlinked_clinic_is_a_referential_error() {
    let fixtures = seeded_store();
    let stray_clinic = test_utils::clinic("Clinica Ajena");
    let stray_clinic_id = stray_clinic.id;
    fixtures.store.insert_clinic(stray_clinic);

    let service = AvailabilityService::new(fixtures.store.clone());
    let err = service
        .resolve(fixtures.doctor_id, stray_clinic_id, at(10, 0), 30, None)
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::DoctorNotAtClinic { clinic_id, .. } if clinic_id == stray_clinic_id);
}

#[tokio::test]
async fn overlap_reports_the_earliest_conflicting_appointment() {
    let fixtures = seeded_store();
    let first = test_utils::appointment(
        fixtures.doctor_id,
        fixtures.patient_id,
        fixtures.clinic_id,
        at(10, 0),
        30,
        AppointmentStatus::Pending,
    );
    let second = test_utils::appointment(
        fixtures.doctor_id,
        fixtures.patient_id,
        fixtures.clinic_id,
        at(10, 30),
        30,
        AppointmentStatus::Confirmed,
    );
    fixtures.store.insert_appointment(first.clone());
    fixtures.store.insert_appointment(second);

    let service = AvailabilityService::new(fixtures.store.clone());

    // Candidate spans both rows; the earliest one is reported.
    let decision = service
        .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 15), 60, None)
        .await
        .unwrap();
    assert_eq!(
        decision,
        SlotDecision::Conflict {
            conflicting_appointment_id: first.id
        }
    );
}

#[tokio::test]
async fn back_to_back_slots_are_available() {
    let fixtures = seeded_store();
    let existing = test_utils::appointment(
        fixtures.doctor_id,
        fixtures.patient_id,
        fixtures.clinic_id,
        at(10, 0),
        30,
        AppointmentStatus::Confirmed,
    );
    fixtures.store.insert_appointment(existing);

    let service = AvailabilityService::new(fixtures.store.clone());

    // Starting exactly at the existing end.
    let after = service
        .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 30), 30, None)
        .await
        .unwrap();
    assert_eq!(after, SlotDecision::Available);

    // Ending exactly at the existing start.
    let before = service
        .resolve(fixtures.doctor_id, fixtures.clinic_id, at(9, 30), 30, None)
        .await
        .unwrap();
    assert_eq!(before, SlotDecision::Available);
}

#[tokio::test]
async fn cancelled_rows_do_not_block_the_slot() {
    let fixtures = seeded_store();
    let cancelled = test_utils::appointment(
        fixtures.doctor_id,
        fixtures.patient_id,
        fixtures.clinic_id,
        at(10, 0),
        30,
        AppointmentStatus::Cancelled,
    );
    fixtures.store.insert_appointment(cancelled);

    let service = AvailabilityService::new(fixtures.store.clone());
    let decision = service
        .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 0), 30, None)
        .await
        .unwrap();
    assert_eq!(decision, SlotDecision::Available);
}

#[tokio::test]
async fn excluded_appointment_is_ignored() {
    let fixtures = seeded_store();
    let existing = test_utils::appointment(
        fixtures.doctor_id,
        fixtures.patient_id,
        fixtures.clinic_id,
        at(10, 0),
        30,
        AppointmentStatus::Pending,
    );
    fixtures.store.insert_appointment(existing.clone());

    let service = AvailabilityService::new(fixtures.store.clone());

    let without_exclusion = service
        .resolve(fixtures.doctor_id, fixtures.clinic_id, at(10, 15), 30, None)
        .await
        .unwrap();
    assert_matches!(without_exclusion, SlotDecision::Conflict { .. });

    let with_exclusion = service
        .resolve(
            fixtures.doctor_id,
            fixtures.clinic_id,
            at(10, 15),
            30,
            Some(existing.id),
        )
        .await
        .unwrap();
    assert_eq!(with_exclusion, SlotDecision::Available);
}

#[tokio::test]
async fn unknown_doctor_clinic_pair_never_resolves() {
    let fixtures = seeded_store();
    let service = AvailabilityService::new(fixtures.store.clone());

    let err = service
        .resolve(Uuid::new_v4(), fixtures.clinic_id, at(10, 0), 30, None)
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::DoctorNotAtClinic { .. });
}
