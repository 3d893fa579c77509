// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::store::StoreError;
use shared_models::appointment::{AppointmentStatus, AppointmentType, CancelledBy};
use shared_models::error::AppError;

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub pricing_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub cancelled_by: CancelledBy,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub pricing_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Outcome of an availability check for one candidate slot.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SlotDecision {
    Available,
    Conflict { conflicting_appointment_id: Uuid },
}

/// The priced terms a booking will be created under, frozen from the
/// governing Pricing row at resolution time.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PricingSnapshot {
    pub pricing_id: Uuid,
    pub price: Decimal,
    pub currency: String,
    pub duration_minutes: i32,
}

/// What governs a booking's duration and cost: a concrete Pricing row, or
/// the default consultation length when the pair has none.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum PricingResolution {
    Priced(PricingSnapshot),
    Unpriced { duration_minutes: i32 },
}

impl PricingResolution {
    pub fn duration_minutes(&self) -> i32 {
        match self {
            PricingResolution::Priced(snapshot) => snapshot.duration_minutes,
            PricingResolution::Unpriced { duration_minutes } => *duration_minutes,
        }
    }

    pub fn pricing_id(&self) -> Option<Uuid> {
        match self {
            PricingResolution::Priced(snapshot) => Some(snapshot.pricing_id),
            PricingResolution::Unpriced { .. } => None,
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        match self {
            PricingResolution::Priced(snapshot) => Some(snapshot.price),
            PricingResolution::Unpriced { .. } => None,
        }
    }

    pub fn currency(&self) -> Option<String> {
        match self {
            PricingResolution::Priced(snapshot) => Some(snapshot.currency.clone()),
            PricingResolution::Unpriced { .. } => None,
        }
    }
}

// ==============================================================================
// ERROR TAXONOMY
// ==============================================================================

/// Every failure the scheduling core can return. Validation errors reject
/// before any store access; referential errors after a lookup; business
/// rejections are recoverable by the caller adjusting input; `Store` wraps
/// infrastructure failures so retryable ones stay distinguishable.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("duration must be at least one minute, got {0}")]
    InvalidDuration(i32),

    #[error("doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("patient {0} not found")]
    PatientNotFound(Uuid),

    #[error("clinic {0} not found")]
    ClinicNotFound(Uuid),

    #[error("pricing {0} not found")]
    PricingNotFound(Uuid),

    #[error("appointment {0} not found")]
    AppointmentNotFound(Uuid),

    #[error("doctor {doctor_id} does not practice at clinic {clinic_id}")]
    DoctorNotAtClinic { doctor_id: Uuid, clinic_id: Uuid },

    #[error("{appointment_type} appointment does not match clinic (virtual: {clinic_is_virtual})")]
    TypeClinicMismatch {
        appointment_type: AppointmentType,
        clinic_is_virtual: bool,
    },

    #[error("more than one active pricing for this doctor and clinic; pass pricing_id")]
    AmbiguousPricing,

    #[error("pricing {0} belongs to a different doctor or clinic")]
    PricingMismatch(Uuid),

    #[error("pricing {0} is no longer active")]
    PricingInactive(Uuid),

    #[error("slot already taken by appointment {0}")]
    SlotConflict(Uuid),

    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("appointment runs until {ends_at}; it cannot be completed yet")]
    TooEarly { ends_at: DateTime<Utc> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::DoctorNotFound(_)
            | SchedulingError::PatientNotFound(_)
            | SchedulingError::ClinicNotFound(_)
            | SchedulingError::PricingNotFound(_)
            | SchedulingError::AppointmentNotFound(_)
            | SchedulingError::DoctorNotAtClinic { .. } => AppError::NotFound(err.to_string()),

            SchedulingError::InvalidDuration(_) => AppError::ValidationError(err.to_string()),

            SchedulingError::SlotConflict(_) | SchedulingError::IllegalTransition { .. } => {
                AppError::Conflict(err.to_string())
            }

            SchedulingError::TypeClinicMismatch { .. }
            | SchedulingError::AmbiguousPricing
            | SchedulingError::PricingMismatch(_)
            | SchedulingError::PricingInactive(_)
            | SchedulingError::TooEarly { .. } => AppError::BadRequest(err.to_string()),

            SchedulingError::Store(store) if store.is_retryable() => {
                AppError::Unavailable(store.to_string())
            }
            SchedulingError::Store(store) => AppError::Database(store.to_string()),
        }
    }
}
