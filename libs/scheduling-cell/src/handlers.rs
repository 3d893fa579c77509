// libs/scheduling-cell/src/handlers.rs
//
// Thin HTTP layer: extract, call the service, map the typed error onto the
// response envelope. No scheduling decisions live here.
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::store::SchedulingStore;
use shared_models::error::AppError;

use crate::models::{
    AvailabilityQuery, BookAppointmentRequest, CancelAppointmentRequest, DoctorAppointmentsQuery,
    PricingQuery, RescheduleAppointmentRequest,
};
use crate::services::{AvailabilityService, BookingService, LifecycleService, PricingService};

#[axum::debug_handler]
pub async fn book_appointment(
    State(store): State<Arc<dyn SchedulingStore>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = BookingService::new(store).book(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "appointment": appointment })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = BookingService::new(store)
        .get_appointment(appointment_id)
        .await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = BookingService::new(store)
        .reschedule(appointment_id, request.new_start_time)
        .await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = LifecycleService::new(store).confirm(appointment_id).await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = LifecycleService::new(store)
        .cancel(appointment_id, request.cancelled_by, request.reason)
        .await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = LifecycleService::new(store).complete(appointment_id).await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(store): State<Arc<dyn SchedulingStore>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let decision = AvailabilityService::new(store)
        .resolve(
            query.doctor_id,
            query.clinic_id,
            query.start_time,
            query.duration_minutes,
            query.exclude_appointment_id,
        )
        .await?;

    Ok(Json(json!(decision)))
}

#[axum::debug_handler]
pub async fn resolve_pricing(
    State(store): State<Arc<dyn SchedulingStore>>,
    Query(query): Query<PricingQuery>,
) -> Result<Json<Value>, AppError> {
    let resolution = PricingService::new(store)
        .resolve(query.doctor_id, query.clinic_id, query.pricing_id)
        .await?;

    Ok(Json(json!(resolution)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointments = BookingService::new(store)
        .patient_appointments(patient_id)
        .await?;
    let total = appointments.len();

    Ok(Json(json!({
        "appointments": appointments,
        "total": total,
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DoctorAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = BookingService::new(store)
        .doctor_appointments_in_range(doctor_id, query.from, query.to)
        .await?;
    let total = appointments.len();

    Ok(Json(json!({
        "appointments": appointments,
        "total": total,
    })))
}
