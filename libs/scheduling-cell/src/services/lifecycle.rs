// libs/scheduling-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::store::{CancellationStamp, SchedulingStore, TransitionOutcome};
use shared_models::appointment::{Appointment, AppointmentStatus, CancelledBy};

use crate::models::SchedulingError;

/// Drives the appointment status machine:
/// Pending -> {Confirmed, Cancelled}; Confirmed -> {Cancelled, Completed};
/// Cancelled and Completed are terminal and nothing re-enters Pending.
///
/// Transitions are idempotent-safe: repeating one whose target equals the
/// current status succeeds without side effects, while contradicting a
/// terminal state is an illegal transition. The store update is a
/// compare-and-set, so concurrent duplicates resolve the same way.
pub struct LifecycleService {
    store: Arc<dyn SchedulingStore>,
}

/// Legal next statuses from `from`.
pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    match from {
        AppointmentStatus::Pending => {
            &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
        }
        AppointmentStatus::Confirmed => {
            &[AppointmentStatus::Cancelled, AppointmentStatus::Completed]
        }
        AppointmentStatus::Cancelled | AppointmentStatus::Completed => &[],
    }
}

/// Statuses the machine allows to move into `to`. The CAS preconditions of
/// confirm/cancel/complete all derive from this one table.
fn transition_sources(to: AppointmentStatus) -> Vec<AppointmentStatus> {
    [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ]
    .into_iter()
    .filter(|from| valid_transitions(*from).contains(&to))
    .collect()
}

impl LifecycleService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    pub async fn confirm(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(appointment_id, AppointmentStatus::Confirmed, None)
            .await
    }

    /// Cancellation never deletes the row; it stamps who cancelled and why.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        cancelled_by: CancelledBy,
        reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        self.transition(
            appointment_id,
            AppointmentStatus::Cancelled,
            Some(CancellationStamp {
                cancelled_by,
                reason,
            }),
        )
        .await
    }

    /// Completion is gated on the appointment's end instant having passed.
    pub async fn complete(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        let current = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))?;

        if current.status == AppointmentStatus::Confirmed && !current.has_ended_by(Utc::now()) {
            return Err(SchedulingError::TooEarly {
                ends_at: current.end_time,
            });
        }

        self.transition(appointment_id, AppointmentStatus::Completed, None)
            .await
    }

    async fn transition(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
        stamp: Option<CancellationStamp>,
    ) -> Result<Appointment, SchedulingError> {
        debug!("requesting transition of {} to {}", appointment_id, to);

        let allowed_from = transition_sources(to);
        match self
            .store
            .transition_appointment(appointment_id, &allowed_from, to, stamp)
            .await?
        {
            None => Err(SchedulingError::AppointmentNotFound(appointment_id)),
            Some(TransitionOutcome::Applied(appointment)) => {
                info!("appointment {} is now {}", appointment.id, appointment.status);
                Ok(appointment)
            }
            // Already where the caller wanted it: idempotent repeat, no
            // second event.
            Some(TransitionOutcome::Refused(appointment)) if appointment.status == to => {
                debug!("appointment {} already {}", appointment.id, to);
                Ok(appointment)
            }
            Some(TransitionOutcome::Refused(appointment)) => {
                Err(SchedulingError::IllegalTransition {
                    from: appointment.status,
                    to,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_the_status_machine() {
        assert_eq!(
            valid_transitions(AppointmentStatus::Pending),
            &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
        );
        assert_eq!(
            valid_transitions(AppointmentStatus::Confirmed),
            &[AppointmentStatus::Cancelled, AppointmentStatus::Completed]
        );
        assert!(valid_transitions(AppointmentStatus::Cancelled).is_empty());
        assert!(valid_transitions(AppointmentStatus::Completed).is_empty());
    }

    #[test]
    fn cas_preconditions_derive_from_the_table() {
        assert_eq!(
            transition_sources(AppointmentStatus::Confirmed),
            vec![AppointmentStatus::Pending]
        );
        assert_eq!(
            transition_sources(AppointmentStatus::Cancelled),
            vec![AppointmentStatus::Pending, AppointmentStatus::Confirmed]
        );
        assert_eq!(
            transition_sources(AppointmentStatus::Completed),
            vec![AppointmentStatus::Confirmed]
        );
        assert!(transition_sources(AppointmentStatus::Pending).is_empty());
    }

    #[test]
    fn nothing_re_enters_pending() {
        for from in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert!(!valid_transitions(from).contains(&AppointmentStatus::Pending));
        }
    }
}
