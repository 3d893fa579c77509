use std::sync::Arc;

use axum::{routing::get, Router};

use directory_cell::router::directory_routes;
use scheduling_cell::router::appointment_routes;
use shared_database::store::SchedulingStore;

pub fn create_router(store: Arc<dyn SchedulingStore>) -> Router {
    Router::new()
        .route("/", get(|| async { "Consulta Health API is running!" }))
        .nest("/appointments", appointment_routes(store.clone()))
        .nest("/directory", directory_routes(store))
}
