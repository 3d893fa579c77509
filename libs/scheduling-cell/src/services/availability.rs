// libs/scheduling-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::store::SchedulingStore;

use crate::models::{SchedulingError, SlotDecision};

/// Read-only capacity check: is a doctor free for a candidate slot, and may
/// they be booked at the requested clinic at all.
pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// Decide whether `[start, start + duration)` is free for the doctor.
    ///
    /// The overlap scan runs across all of the doctor's clinics; the clinic
    /// argument only gates that the doctor actually practices there.
    /// `exclude` skips one appointment, used when re-validating a move of an
    /// existing booking.
    pub async fn resolve(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i32,
        exclude: Option<Uuid>,
    ) -> Result<SlotDecision, SchedulingError> {
        if duration_minutes < 1 {
            return Err(SchedulingError::InvalidDuration(duration_minutes));
        }

        self.store
            .get_doctor_clinic(doctor_id, clinic_id)
            .await?
            .ok_or(SchedulingError::DoctorNotAtClinic {
                doctor_id,
                clinic_id,
            })?;

        let end = start + Duration::minutes(duration_minutes as i64);
        debug!(
            "checking availability for doctor {} in [{}, {})",
            doctor_id, start, end
        );

        let occupied = self
            .store
            .list_appointments_for_doctor_in_range(doctor_id, start, end, exclude)
            .await?;

        // The store already restricts to intersecting rows; re-checking the
        // half-open overlap here keeps the decision independent of how tight
        // each adapter's range filter is. Back-to-back slots never conflict.
        match occupied
            .iter()
            .filter(|a| a.blocks_slot() && a.overlaps(start, end))
            .min_by_key(|a| a.start_time)
        {
            Some(conflict) => {
                warn!(
                    "slot [{}, {}) for doctor {} conflicts with appointment {}",
                    start, end, doctor_id, conflict.id
                );
                Ok(SlotDecision::Conflict {
                    conflicting_appointment_id: conflict.id,
                })
            }
            None => Ok(SlotDecision::Available),
        }
    }
}
