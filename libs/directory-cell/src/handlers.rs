// libs/directory-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::store::SchedulingStore;
use shared_models::error::AppError;

use crate::models::{page_size, ListDoctorsQuery, PageQuery};
use crate::services::DirectoryService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(store): State<Arc<dyn SchedulingStore>>,
    Query(query): Query<ListDoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DirectoryService::new(store)
        .list_doctors(
            query.speciality_id,
            page_size(query.limit),
            query.offset.unwrap_or(0),
        )
        .await?;
    let total = doctors.len();

    Ok(Json(json!({ "doctors": doctors, "total": total })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let profile = DirectoryService::new(store)
        .get_doctor_profile(doctor_id)
        .await?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn list_doctor_opinions(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let opinions = DirectoryService::new(store).list_opinions(doctor_id).await?;
    let total = opinions.len();

    Ok(Json(json!({ "opinions": opinions, "total": total })))
}

#[axum::debug_handler]
pub async fn list_clinics(
    State(store): State<Arc<dyn SchedulingStore>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let clinics = DirectoryService::new(store)
        .list_clinics(page_size(query.limit), query.offset.unwrap_or(0))
        .await?;
    let total = clinics.len();

    Ok(Json(json!({ "clinics": clinics, "total": total })))
}

#[axum::debug_handler]
pub async fn get_clinic(
    State(store): State<Arc<dyn SchedulingStore>>,
    Path(clinic_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let clinic = DirectoryService::new(store).get_clinic(clinic_id).await?;

    Ok(Json(json!(clinic)))
}
