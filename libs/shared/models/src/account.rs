// libs/shared/models/src/account.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::SoftDeletable;

/// Account root. The stored row keeps both profile links independently
/// nullable; the schema permits an account to hold a patient profile and a
/// doctor profile at the same time, and nothing here forbids it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Booking-flow view of an account: exactly one role at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", content = "profile_id", rename_all = "snake_case")]
pub enum AccountProfile {
    Patient(Uuid),
    Doctor(Uuid),
    Unassigned,
}

impl User {
    /// Projects the nullable profile links onto the single role the account
    /// plays in the booking flow. Booking is a patient action, so an account
    /// holding both profiles acts through its patient profile here; its
    /// doctor profile stays reachable via `doctor_id` for the doctor-side
    /// surfaces.
    pub fn booking_profile(&self) -> AccountProfile {
        match (self.patient_id, self.doctor_id) {
            (Some(patient_id), _) => AccountProfile::Patient(patient_id),
            (None, Some(doctor_id)) => AccountProfile::Doctor(doctor_id),
            (None, None) => AccountProfile::Unassigned,
        }
    }

    pub fn has_dual_profiles(&self) -> bool {
        self.patient_id.is_some() && self.doctor_id.is_some()
    }
}

impl SoftDeletable for User {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
