// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::store::{RescheduleOutcome, SchedulingStore, StoreError};
use shared_models::appointment::{Appointment, AppointmentStatus, AppointmentType, NewAppointment};

use crate::models::{BookAppointmentRequest, SchedulingError, SlotDecision};
use crate::services::availability::AvailabilityService;
use crate::services::pricing::PricingService;

/// The sole writer of new appointments. Composes the pricing and
/// availability resolvers, then hands the final conflict decision to the
/// store's atomic insert guard. The early availability check only gives
/// callers a fast rejection; under concurrency the guard has the last word.
pub struct BookingService {
    store: Arc<dyn SchedulingStore>,
    availability: AvailabilityService,
    pricing: PricingService,
}

impl BookingService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self {
            availability: AvailabilityService::new(Arc::clone(&store)),
            pricing: PricingService::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        debug!(
            "booking request: doctor {} patient {} clinic {} at {}",
            request.doctor_id, request.patient_id, request.clinic_id, request.start_time
        );

        self.store
            .get_doctor(request.doctor_id)
            .await?
            .ok_or(SchedulingError::DoctorNotFound(request.doctor_id))?;
        self.store
            .get_patient(request.patient_id)
            .await?
            .ok_or(SchedulingError::PatientNotFound(request.patient_id))?;
        let clinic = self
            .store
            .get_clinic(request.clinic_id)
            .await?
            .ok_or(SchedulingError::ClinicNotFound(request.clinic_id))?;

        // Online consultations need a virtual clinic; in-person ones a
        // physical address.
        let type_matches = match request.appointment_type {
            AppointmentType::Online => clinic.is_virtual,
            AppointmentType::InPerson => !clinic.is_virtual,
        };
        if !type_matches {
            warn!(
                "rejected {} booking against clinic {} (virtual: {})",
                request.appointment_type, clinic.id, clinic.is_virtual
            );
            return Err(SchedulingError::TypeClinicMismatch {
                appointment_type: request.appointment_type,
                clinic_is_virtual: clinic.is_virtual,
            });
        }

        let resolution = self
            .pricing
            .resolve(request.doctor_id, request.clinic_id, request.pricing_id)
            .await?;
        let duration_minutes = resolution.duration_minutes();

        if let SlotDecision::Conflict {
            conflicting_appointment_id,
        } = self
            .availability
            .resolve(
                request.doctor_id,
                request.clinic_id,
                request.start_time,
                duration_minutes,
                None,
            )
            .await?
        {
            return Err(SchedulingError::SlotConflict(conflicting_appointment_id));
        }

        let new = NewAppointment {
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            clinic_id: request.clinic_id,
            pricing_id: resolution.pricing_id(),
            start_time: request.start_time,
            duration_minutes,
            price: resolution.price(),
            currency: resolution.currency(),
            appointment_type: request.appointment_type,
            notes: request.notes,
        };

        match self.store.create_appointment(&new).await {
            Ok(appointment) => {
                info!(
                    "appointment {} booked for doctor {} at {}",
                    appointment.id, appointment.doctor_id, appointment.start_time
                );
                Ok(appointment)
            }
            // Lost the race: someone booked the slot between the check and
            // the guarded insert.
            Err(StoreError::SlotTaken {
                conflicting_appointment_id,
            }) => {
                warn!(
                    "booking for doctor {} at {} lost the slot to appointment {}",
                    request.doctor_id, request.start_time, conflicting_appointment_id
                );
                Err(SchedulingError::SlotConflict(conflicting_appointment_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Move a pending appointment to a new start, keeping its frozen
    /// duration. Confirmed and terminal appointments do not move.
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        new_start: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let current = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))?;

        if current.status != AppointmentStatus::Pending {
            return Err(SchedulingError::IllegalTransition {
                from: current.status,
                to: AppointmentStatus::Pending,
            });
        }

        if let SlotDecision::Conflict {
            conflicting_appointment_id,
        } = self
            .availability
            .resolve(
                current.doctor_id,
                current.clinic_id,
                new_start,
                current.duration_minutes,
                Some(appointment_id),
            )
            .await?
        {
            return Err(SchedulingError::SlotConflict(conflicting_appointment_id));
        }

        match self
            .store
            .reschedule_appointment(appointment_id, &[AppointmentStatus::Pending], new_start)
            .await
        {
            Ok(Some(RescheduleOutcome::Applied(appointment))) => {
                info!(
                    "appointment {} moved to {}",
                    appointment.id, appointment.start_time
                );
                Ok(appointment)
            }
            Ok(Some(RescheduleOutcome::Refused(appointment))) => {
                Err(SchedulingError::IllegalTransition {
                    from: appointment.status,
                    to: AppointmentStatus::Pending,
                })
            }
            Ok(None) => Err(SchedulingError::AppointmentNotFound(appointment_id)),
            Err(StoreError::SlotTaken {
                conflicting_appointment_id,
            }) => Err(SchedulingError::SlotConflict(conflicting_appointment_id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.store
            .get_appointment(appointment_id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))
    }

    pub async fn patient_appointments(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.store
            .get_patient(patient_id)
            .await?
            .ok_or(SchedulingError::PatientNotFound(patient_id))?;
        Ok(self.store.list_appointments_for_patient(patient_id).await?)
    }

    pub async fn doctor_appointments_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.store
            .get_doctor(doctor_id)
            .await?
            .ok_or(SchedulingError::DoctorNotFound(doctor_id))?;
        Ok(self
            .store
            .list_appointments_for_doctor_in_range(doctor_id, from, to, None)
            .await?)
    }
}
