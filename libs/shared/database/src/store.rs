// libs/shared/database/src/store.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::account::User;
use shared_models::appointment::{Appointment, AppointmentStatus, CancelledBy, NewAppointment};
use shared_models::directory::{
    Clinic, Doctor, DoctorClinic, Opinion, Patient, Pricing, Speciality,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store did not answer within the configured timeout.
    #[error("store request timed out")]
    Timeout,

    /// The backing store is unreachable or refusing connections.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing store answered with an error status.
    #[error("store rejected the request ({status}): {message}")]
    Backend { status: u16, message: String },

    /// A response arrived but could not be decoded into the expected rows.
    #[error("malformed store response: {0}")]
    Malformed(String),

    /// The slot-exclusion guard refused an insert or move.
    #[error("slot already taken by appointment {conflicting_appointment_id}")]
    SlotTaken { conflicting_appointment_id: Uuid },
}

impl StoreError {
    /// Infrastructure failures callers may retry with backoff. Business
    /// refusals (`SlotTaken`) and backend rejections are not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout | StoreError::Unavailable(_))
    }
}

/// Result of a compare-and-set status update.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The row moved to the requested status in this call.
    Applied(Appointment),
    /// The row exists but its current status was outside `allowed_from`.
    /// Returned untouched so the caller can tell idempotent repeats from
    /// illegal transitions.
    Refused(Appointment),
}

/// Result of an atomic slot move.
#[derive(Debug, Clone)]
pub enum RescheduleOutcome {
    Applied(Appointment),
    /// Row exists but its status was outside `allowed_from`.
    Refused(Appointment),
}

/// Audit stamp written onto a row when it is cancelled.
#[derive(Debug, Clone)]
pub struct CancellationStamp {
    pub cancelled_by: CancelledBy,
    pub reason: Option<String>,
}

/// Repository port of the scheduling core. Every read excludes soft-deleted
/// rows (one filter inside each adapter, not per call site); historical rows
/// stay addressable only through the appointments they are referenced by.
///
/// The two write guards are the correctness-critical part of the contract:
/// `create_appointment` and `reschedule_appointment` must verify the
/// doctor-slot exclusion invariant and perform the write inside one atomic
/// unit, so that concurrent requests for the same slot resolve to exactly
/// one winner. `transition_appointment` must be a compare-and-set on the
/// current status.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    // ---- account & referential reads -------------------------------------
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;
    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;
    async fn get_clinic(&self, id: Uuid) -> Result<Option<Clinic>, StoreError>;
    async fn get_pricing(&self, id: Uuid) -> Result<Option<Pricing>, StoreError>;
    async fn get_doctor_clinic(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<Option<DoctorClinic>, StoreError>;
    async fn list_pricings_for_pair(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<Vec<Pricing>, StoreError>;

    // ---- scheduling reads ------------------------------------------------
    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Non-cancelled, live appointments of one doctor whose half-open slot
    /// intersects `[from, to)`, minus `exclude`, ordered by start time.
    async fn list_appointments_for_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn list_appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, StoreError>;

    // ---- scheduling writes -----------------------------------------------
    /// Atomic conditional insert. Fails with `StoreError::SlotTaken` when the
    /// slot-exclusion invariant would be violated; on success the stored row
    /// (id assigned, status `Pending`, timestamps set) is returned.
    async fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment, StoreError>;

    /// Compare-and-set: move the row to `to` iff its current status is one of
    /// `allowed_from`. `None` when no live row has this id.
    async fn transition_appointment(
        &self,
        id: Uuid,
        allowed_from: &[AppointmentStatus],
        to: AppointmentStatus,
        stamp: Option<CancellationStamp>,
    ) -> Result<Option<TransitionOutcome>, StoreError>;

    /// Atomic slot move keeping the stored duration: re-checks the exclusion
    /// invariant (ignoring the row itself) and rewrites start/end in one
    /// unit. `None` when no live row has this id.
    async fn reschedule_appointment(
        &self,
        id: Uuid,
        allowed_from: &[AppointmentStatus],
        new_start: DateTime<Utc>,
    ) -> Result<Option<RescheduleOutcome>, StoreError>;

    // ---- directory reads -------------------------------------------------
    async fn list_doctors(
        &self,
        speciality_id: Option<Uuid>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Doctor>, StoreError>;
    async fn list_clinics(&self, limit: u32, offset: u32) -> Result<Vec<Clinic>, StoreError>;
    async fn list_specialities_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Speciality>, StoreError>;
    async fn list_clinics_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Clinic>, StoreError>;
    async fn list_pricings_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Pricing>, StoreError>;
    async fn list_opinions_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Opinion>, StoreError>;
}
