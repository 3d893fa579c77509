use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use futures::future::join_all;
use uuid::Uuid;

use scheduling_cell::models::{BookAppointmentRequest, SchedulingError};
use scheduling_cell::services::BookingService;
use shared_database::store::SchedulingStore;
use shared_models::appointment::{AppointmentStatus, AppointmentType};
use shared_utils::test_utils::{self, seeded_store};

fn at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 15, hour, minute, 0).unwrap()
}

fn book_request(
    fixtures: &test_utils::SchedulingFixtures,
    hour: u32,
    minute: u32,
) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: fixtures.doctor_id,
        patient_id: fixtures.patient_id,
        clinic_id: fixtures.clinic_id,
        start_time: at(hour, minute),
        appointment_type: AppointmentType::InPerson,
        pricing_id: None,
        notes: None,
    }
}

#[tokio::test]
async fn booking_freezes_the_pricing_snapshot() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let appointment = service.book(book_request(&fixtures, 10, 0)).await.unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.duration_minutes, 30);
    assert_eq!(appointment.pricing_id, Some(fixtures.pricing_id));
    assert_eq!(appointment.currency.as_deref(), Some("EUR"));
    assert!(appointment.price.is_some());
    assert_eq!(appointment.end_time, at(10, 30));
}

#[tokio::test]
async fn overlapping_booking_conflicts_even_at_another_clinic() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let first = service.book(book_request(&fixtures, 10, 0)).await.unwrap();

    // 10:15 falls inside the first slot; the doctor is busy regardless of
    // which clinic the second booking targets.
    let mut second = book_request(&fixtures, 10, 15);
    second.clinic_id = fixtures.virtual_clinic_id;
    second.appointment_type = AppointmentType::Online;
    let err = service.book(second).await.unwrap_err();
    assert_matches!(err, SchedulingError::SlotConflict(id) if id == first.id);

    // 10:30 starts exactly at the first slot's end: back-to-back is allowed.
    let third = service.book(book_request(&fixtures, 10, 30)).await.unwrap();
    assert_eq!(third.start_time, at(10, 30));
}

#[tokio::test]
async fn online_booking_against_physical_clinic_writes_nothing() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let mut request = book_request(&fixtures, 9, 0);
    request.appointment_type = AppointmentType::Online;

    let err = service.book(request).await.unwrap_err();
    assert_matches!(
        err,
        SchedulingError::TypeClinicMismatch {
            clinic_is_virtual: false,
            ..
        }
    );

    let rows = fixtures
        .store
        .list_appointments_for_doctor_in_range(fixtures.doctor_id, at(0, 0), at(23, 59), None)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn in_person_booking_against_virtual_clinic_is_rejected() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let mut request = book_request(&fixtures, 9, 0);
    request.clinic_id = fixtures.virtual_clinic_id;

    let err = service.book(request).await.unwrap_err();
    assert_matches!(
        err,
        SchedulingError::TypeClinicMismatch {
            clinic_is_virtual: true,
            ..
        }
    );
}

#[tokio::test]
async fn foreign_pricing_id_is_a_mismatch() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    // Pricing of the virtual clinic pair, booked against the physical one.
    let mut request = book_request(&fixtures, 9, 0);
    request.pricing_id = Some(fixtures.online_pricing_id);

    let err = service.book(request).await.unwrap_err();
    assert_matches!(err, SchedulingError::PricingMismatch(id) if id == fixtures.online_pricing_id);
}

#[tokio::test]
async fn inactive_pricing_is_rejected() {
    let fixtures = seeded_store();
    fixtures.store.deactivate_pricing(fixtures.pricing_id);
    let service = BookingService::new(fixtures.store.clone());

    let mut request = book_request(&fixtures, 9, 0);
    request.pricing_id = Some(fixtures.pricing_id);

    let err = service.book(request).await.unwrap_err();
    assert_matches!(err, SchedulingError::PricingInactive(id) if id == fixtures.pricing_id);
}

#[tokio::test]
async fn two_active_pricings_without_a_choice_are_ambiguous() {
    let fixtures = seeded_store();
    fixtures.store.insert_pricing(test_utils::pricing(
        fixtures.doctor_id,
        fixtures.clinic_id,
        45,
    ));
    let service = BookingService::new(fixtures.store.clone());

    let err = service.book(book_request(&fixtures, 9, 0)).await.unwrap_err();
    assert_matches!(err, SchedulingError::AmbiguousPricing);
}

#[tokio::test]
async fn unpriced_pair_books_with_the_default_length() {
    let fixtures = seeded_store();
    // A clinic the doctor practices at without any pricing.
    let bare_clinic = test_utils::clinic("Consultorio Sur");
    let bare_clinic_id = bare_clinic.id;
    fixtures.store.insert_clinic(bare_clinic);
    fixtures
        .store
        .link_doctor_clinic(fixtures.doctor_id, bare_clinic_id);

    let service = BookingService::new(fixtures.store.clone());
    let mut request = book_request(&fixtures, 9, 0);
    request.clinic_id = bare_clinic_id;

    let appointment = service.book(request).await.unwrap();
    assert_eq!(appointment.duration_minutes, 30);
    assert_eq!(appointment.pricing_id, None);
    assert_eq!(appointment.price, None);
}

#[tokio::test]
async fn unknown_references_fail_with_not_found() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let mut request = book_request(&fixtures, 9, 0);
    request.doctor_id = Uuid::new_v4();
    assert_matches!(
        service.book(request).await.unwrap_err(),
        SchedulingError::DoctorNotFound(_)
    );

    let mut request = book_request(&fixtures, 9, 0);
    request.patient_id = Uuid::new_v4();
    assert_matches!(
        service.book(request).await.unwrap_err(),
        SchedulingError::PatientNotFound(_)
    );

    let mut request = book_request(&fixtures, 9, 0);
    request.clinic_id = Uuid::new_v4();
    assert_matches!(
        service.book(request).await.unwrap_err(),
        SchedulingError::ClinicNotFound(_)
    );
}

#[tokio::test]
async fn parallel_bookings_for_one_slot_have_exactly_one_winner() {
    let fixtures = seeded_store();

    let attempts = (0..8).map(|_| {
        let store = fixtures.store.clone();
        let request = book_request(&fixtures, 11, 0);
        async move { BookingService::new(store).book(request).await }
    });

    let results = join_all(attempts).await;

    let won = results.iter().filter(|r| r.is_ok()).count();
    let lost = results
        .iter()
        .filter(|r| matches!(r, Err(SchedulingError::SlotConflict(_))))
        .count();
    assert_eq!(won, 1);
    assert_eq!(lost, 7);
}

#[tokio::test]
async fn pending_appointment_can_move_to_a_free_slot() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let appointment = service.book(book_request(&fixtures, 10, 0)).await.unwrap();
    let moved = service.reschedule(appointment.id, at(14, 0)).await.unwrap();

    assert_eq!(moved.start_time, at(14, 0));
    assert_eq!(moved.end_time, at(14, 30));
    assert_eq!(moved.duration_minutes, appointment.duration_minutes);
}

#[tokio::test]
async fn reschedule_into_an_occupied_slot_conflicts() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());

    let blocker = service.book(book_request(&fixtures, 10, 0)).await.unwrap();
    let movable = service.book(book_request(&fixtures, 12, 0)).await.unwrap();

    let err = service.reschedule(movable.id, at(10, 15)).await.unwrap_err();
    assert_matches!(err, SchedulingError::SlotConflict(id) if id == blocker.id);

    // Moving within its own window is fine: the row excludes itself.
    let moved = service.reschedule(movable.id, at(12, 15)).await.unwrap();
    assert_eq!(moved.start_time, at(12, 15));
}

#[tokio::test]
async fn confirmed_appointments_do_not_move() {
    let fixtures = seeded_store();
    let service = BookingService::new(fixtures.store.clone());
    let lifecycle = scheduling_cell::services::LifecycleService::new(fixtures.store.clone());

    let appointment = service.book(book_request(&fixtures, 10, 0)).await.unwrap();
    lifecycle.confirm(appointment.id).await.unwrap();

    let err = service.reschedule(appointment.id, at(15, 0)).await.unwrap_err();
    assert_matches!(
        err,
        SchedulingError::IllegalTransition {
            from: AppointmentStatus::Confirmed,
            ..
        }
    );
}
