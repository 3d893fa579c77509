// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::store::SchedulingStore;

use crate::handlers;

pub fn directory_routes(store: Arc<dyn SchedulingStore>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/doctors/{doctor_id}/opinions", get(handlers::list_doctor_opinions))
        .route("/clinics", get(handlers::list_clinics))
        .route("/clinics/{clinic_id}", get(handlers::get_clinic))
        .with_state(store)
}
