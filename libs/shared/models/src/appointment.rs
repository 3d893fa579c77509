// libs/shared/models/src/appointment.rs
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::directory::SoftDeletable;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub pricing_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    /// Denormalized `start_time + duration_minutes`, written by the store so
    /// range queries stay index-friendly.
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    /// Price snapshot taken from the governing Pricing at booking time.
    /// Never recomputed when the Pricing row later changes or deactivates.
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Whether this appointment still occupies its doctor's slot.
    /// Cancelled and soft-deleted rows free the interval; everything else
    /// (pending, confirmed, completed) keeps blocking it.
    pub fn blocks_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled && self.is_live()
    }

    /// Half-open interval intersection: `[start_time, end_time)` against
    /// `[start, end)`. Back-to-back slots do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    pub fn has_ended_by(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }
}

impl SoftDeletable for Appointment {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Insert payload for the entity store. The store assigns the id, the
/// `Pending` status, the denormalized end time and the audit timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub pricing_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes as i64)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    InPerson,
    Online,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::InPerson => write!(f, "in_person"),
            AppointmentType::Online => write!(f, "online"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Patient,
    Doctor,
    System,
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelledBy::Patient => write!(f, "patient"),
            CancelledBy::Doctor => write!(f, "doctor"),
            CancelledBy::System => write!(f, "system"),
        }
    }
}
