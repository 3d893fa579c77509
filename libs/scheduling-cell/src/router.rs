// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_database::store::SchedulingStore;

use crate::handlers;

pub fn appointment_routes(store: Arc<dyn SchedulingStore>) -> Router {
    Router::new()
        // Booking and resolution
        .route("/", post(handlers::book_appointment))
        .route("/availability", get(handlers::check_availability))
        .route("/pricing", get(handlers::resolve_pricing))
        // Single appointment and its lifecycle
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        // Listings
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments))
        .with_state(store)
}
