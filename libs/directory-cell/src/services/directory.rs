// libs/directory-cell/src/services/directory.rs
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::store::SchedulingStore;
use shared_models::directory::{Clinic, Doctor, Opinion};

use crate::models::{DirectoryError, DoctorProfile};

/// Read-only marketplace views over the same soft-delete-filtered store the
/// scheduling core uses. No writes, no caching.
pub struct DirectoryService {
    store: Arc<dyn SchedulingStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    pub async fn list_doctors(
        &self,
        speciality_id: Option<Uuid>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Doctor>, DirectoryError> {
        debug!(
            "listing doctors (speciality: {:?}, limit {}, offset {})",
            speciality_id, limit, offset
        );
        Ok(self.store.list_doctors(speciality_id, limit, offset).await?)
    }

    /// Profile aggregation: the doctor plus specialities, clinics and the
    /// currently bookable (active) pricings.
    pub async fn get_doctor_profile(&self, doctor_id: Uuid) -> Result<DoctorProfile, DirectoryError> {
        let doctor = self
            .store
            .get_doctor(doctor_id)
            .await?
            .ok_or(DirectoryError::DoctorNotFound(doctor_id))?;

        let specialities = self.store.list_specialities_for_doctor(doctor_id).await?;
        let clinics = self.store.list_clinics_for_doctor(doctor_id).await?;
        let pricings = self
            .store
            .list_pricings_for_doctor(doctor_id)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .collect();

        Ok(DoctorProfile {
            doctor,
            specialities,
            clinics,
            pricings,
        })
    }

    pub async fn list_clinics(&self, limit: u32, offset: u32) -> Result<Vec<Clinic>, DirectoryError> {
        Ok(self.store.list_clinics(limit, offset).await?)
    }

    pub async fn get_clinic(&self, clinic_id: Uuid) -> Result<Clinic, DirectoryError> {
        self.store
            .get_clinic(clinic_id)
            .await?
            .ok_or(DirectoryError::ClinicNotFound(clinic_id))
    }

    /// Raw opinion rows for a doctor, newest first. Rating aggregation is a
    /// reporting concern and does not live here.
    pub async fn list_opinions(&self, doctor_id: Uuid) -> Result<Vec<Opinion>, DirectoryError> {
        self.store
            .get_doctor(doctor_id)
            .await?
            .ok_or(DirectoryError::DoctorNotFound(doctor_id))?;
        Ok(self.store.list_opinions_for_doctor(doctor_id).await?)
    }
}
