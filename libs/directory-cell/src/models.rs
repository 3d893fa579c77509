// libs/directory-cell/src/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::store::StoreError;
use shared_models::directory::{Clinic, Doctor, Pricing, Speciality};
use shared_models::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct ListDoctorsQuery {
    pub speciality_id: Option<Uuid>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub fn page_size(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
}

/// A doctor with the associations the marketplace shows alongside the
/// profile. Pricings are restricted to active offers; historical rows stay
/// reachable only through the appointments that reference them.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorProfile {
    pub doctor: Doctor,
    pub specialities: Vec<Speciality>,
    pub clinics: Vec<Clinic>,
    pub pricings: Vec<Pricing>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("clinic {0} not found")]
    ClinicNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DoctorNotFound(_) | DirectoryError::ClinicNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DirectoryError::Store(store) if store.is_retryable() => {
                AppError::Unavailable(store.to_string())
            }
            DirectoryError::Store(store) => AppError::Database(store.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_defaults_and_caps() {
        assert_eq!(page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(page_size(Some(10)), 10);
        assert_eq!(page_size(Some(10_000)), MAX_PAGE_SIZE);
    }
}
