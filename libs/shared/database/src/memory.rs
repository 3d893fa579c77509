// libs/shared/database/src/memory.rs
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use shared_models::account::User;
use shared_models::appointment::{Appointment, AppointmentStatus, NewAppointment};
use shared_models::directory::{
    Clinic, Doctor, DoctorClinic, DoctorSpeciality, Opinion, Patient, Pricing, SoftDeletable,
    Speciality,
};

use crate::store::{
    CancellationStamp, RescheduleOutcome, SchedulingStore, StoreError, TransitionOutcome,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    doctors: HashMap<Uuid, Doctor>,
    patients: HashMap<Uuid, Patient>,
    clinics: HashMap<Uuid, Clinic>,
    specialities: HashMap<Uuid, Speciality>,
    pricings: HashMap<Uuid, Pricing>,
    opinions: HashMap<Uuid, Opinion>,
    doctor_clinics: Vec<DoctorClinic>,
    doctor_specialities: Vec<DoctorSpeciality>,
    appointments: HashMap<Uuid, Appointment>,
}

/// In-memory entity store for tests and local development. One mutex guards
/// the whole state, so the conflict check and the row write of the guarded
/// operations happen under a single lock, the same atomicity the PostgREST
/// adapter gets from its transactional stored procedures.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store lock poisoned")
    }

    // ---- seeding (upsert by id) ------------------------------------------

    pub fn insert_user(&self, user: User) {
        self.state().users.insert(user.id, user);
    }

    pub fn insert_doctor(&self, doctor: Doctor) {
        self.state().doctors.insert(doctor.id, doctor);
    }

    pub fn insert_patient(&self, patient: Patient) {
        self.state().patients.insert(patient.id, patient);
    }

    pub fn insert_clinic(&self, clinic: Clinic) {
        self.state().clinics.insert(clinic.id, clinic);
    }

    pub fn insert_speciality(&self, speciality: Speciality) {
        self.state().specialities.insert(speciality.id, speciality);
    }

    pub fn insert_pricing(&self, pricing: Pricing) {
        self.state().pricings.insert(pricing.id, pricing);
    }

    pub fn insert_opinion(&self, opinion: Opinion) {
        self.state().opinions.insert(opinion.id, opinion);
    }

    pub fn insert_appointment(&self, appointment: Appointment) {
        self.state().appointments.insert(appointment.id, appointment);
    }

    pub fn link_doctor_clinic(&self, doctor_id: Uuid, clinic_id: Uuid) {
        self.state().doctor_clinics.push(DoctorClinic {
            doctor_id,
            clinic_id,
            created_at: Utc::now(),
            deleted_at: None,
        });
    }

    pub fn link_doctor_speciality(&self, doctor_id: Uuid, speciality_id: Uuid) {
        self.state().doctor_specialities.push(DoctorSpeciality {
            doctor_id,
            speciality_id,
            created_at: Utc::now(),
            deleted_at: None,
        });
    }

    pub fn deactivate_pricing(&self, id: Uuid) {
        if let Some(pricing) = self.state().pricings.get_mut(&id) {
            pricing.is_active = false;
            pricing.updated_at = Utc::now();
        }
    }
}

fn live_get<T: SoftDeletable + Clone>(map: &HashMap<Uuid, T>, id: Uuid) -> Option<T> {
    map.get(&id).filter(|row| row.is_live()).cloned()
}

impl MemoryState {
    /// Earliest-starting live, non-cancelled appointment of `doctor_id` whose
    /// slot intersects `[start, end)`, skipping `exclude`.
    fn slot_conflict(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Option<&Appointment> {
        self.appointments
            .values()
            .filter(|a| {
                a.doctor_id == doctor_id
                    && Some(a.id) != exclude
                    && a.blocks_slot()
                    && a.overlaps(start, end)
            })
            .min_by_key(|a| a.start_time)
    }
}

#[async_trait]
impl SchedulingStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(live_get(&self.state().users, id))
    }

    async fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        Ok(live_get(&self.state().doctors, id))
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        Ok(live_get(&self.state().patients, id))
    }

    async fn get_clinic(&self, id: Uuid) -> Result<Option<Clinic>, StoreError> {
        Ok(live_get(&self.state().clinics, id))
    }

    async fn get_pricing(&self, id: Uuid) -> Result<Option<Pricing>, StoreError> {
        Ok(live_get(&self.state().pricings, id))
    }

    async fn get_doctor_clinic(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<Option<DoctorClinic>, StoreError> {
        Ok(self
            .state()
            .doctor_clinics
            .iter()
            .find(|j| j.doctor_id == doctor_id && j.clinic_id == clinic_id && j.is_live())
            .cloned())
    }

    async fn list_pricings_for_pair(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<Vec<Pricing>, StoreError> {
        Ok(self
            .state()
            .pricings
            .values()
            .filter(|p| p.is_live() && p.belongs_to(doctor_id, clinic_id))
            .cloned()
            .collect())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(live_get(&self.state().appointments, id))
    }

    async fn list_appointments_for_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state();
        let mut rows: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| {
                a.doctor_id == doctor_id
                    && Some(a.id) != exclude
                    && a.blocks_slot()
                    && a.overlaps(from, to)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state();
        let mut rows: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id && a.is_live())
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment, StoreError> {
        let mut state = self.state();
        let end = new.end_time();

        if let Some(conflict) = state.slot_conflict(new.doctor_id, new.start_time, end, None) {
            return Err(StoreError::SlotTaken {
                conflicting_appointment_id: conflict.id,
            });
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: new.doctor_id,
            patient_id: new.patient_id,
            clinic_id: new.clinic_id,
            pricing_id: new.pricing_id,
            start_time: new.start_time,
            end_time: end,
            duration_minutes: new.duration_minutes,
            price: new.price,
            currency: new.currency.clone(),
            appointment_type: new.appointment_type,
            status: AppointmentStatus::Pending,
            notes: new.notes.clone(),
            cancelled_by: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn transition_appointment(
        &self,
        id: Uuid,
        allowed_from: &[AppointmentStatus],
        to: AppointmentStatus,
        stamp: Option<CancellationStamp>,
    ) -> Result<Option<TransitionOutcome>, StoreError> {
        let mut state = self.state();
        let Some(row) = state.appointments.get_mut(&id).filter(|a| a.is_live()) else {
            return Ok(None);
        };

        if !allowed_from.contains(&row.status) {
            return Ok(Some(TransitionOutcome::Refused(row.clone())));
        }

        row.status = to;
        row.updated_at = Utc::now();
        if let Some(stamp) = stamp {
            row.cancelled_by = Some(stamp.cancelled_by);
            row.cancellation_reason = stamp.reason;
        }
        Ok(Some(TransitionOutcome::Applied(row.clone())))
    }

    async fn reschedule_appointment(
        &self,
        id: Uuid,
        allowed_from: &[AppointmentStatus],
        new_start: DateTime<Utc>,
    ) -> Result<Option<RescheduleOutcome>, StoreError> {
        let mut state = self.state();
        let Some(row) = state.appointments.get(&id).filter(|a| a.is_live()) else {
            return Ok(None);
        };

        if !allowed_from.contains(&row.status) {
            return Ok(Some(RescheduleOutcome::Refused(row.clone())));
        }

        let doctor_id = row.doctor_id;
        let new_end = new_start + Duration::minutes(row.duration_minutes as i64);
        if let Some(conflict) = state.slot_conflict(doctor_id, new_start, new_end, Some(id)) {
            return Err(StoreError::SlotTaken {
                conflicting_appointment_id: conflict.id,
            });
        }

        let Some(row) = state.appointments.get_mut(&id) else {
            return Ok(None);
        };
        row.start_time = new_start;
        row.end_time = new_end;
        row.updated_at = Utc::now();
        Ok(Some(RescheduleOutcome::Applied(row.clone())))
    }

    async fn list_doctors(
        &self,
        speciality_id: Option<Uuid>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Doctor>, StoreError> {
        let state = self.state();
        let mut doctors: Vec<Doctor> = state
            .doctors
            .values()
            .filter(|d| d.is_live())
            .filter(|d| match speciality_id {
                None => true,
                Some(speciality_id) => state.doctor_specialities.iter().any(|j| {
                    j.doctor_id == d.id && j.speciality_id == speciality_id && j.is_live()
                }),
            })
            .cloned()
            .collect();
        doctors.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(doctors
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_clinics(&self, limit: u32, offset: u32) -> Result<Vec<Clinic>, StoreError> {
        let state = self.state();
        let mut clinics: Vec<Clinic> = state.clinics.values().filter(|c| c.is_live()).cloned().collect();
        clinics.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clinics
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_specialities_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Speciality>, StoreError> {
        let state = self.state();
        Ok(state
            .doctor_specialities
            .iter()
            .filter(|j| j.doctor_id == doctor_id && j.is_live())
            .filter_map(|j| live_get(&state.specialities, j.speciality_id))
            .collect())
    }

    async fn list_clinics_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Clinic>, StoreError> {
        let state = self.state();
        Ok(state
            .doctor_clinics
            .iter()
            .filter(|j| j.doctor_id == doctor_id && j.is_live())
            .filter_map(|j| live_get(&state.clinics, j.clinic_id))
            .collect())
    }

    async fn list_pricings_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Pricing>, StoreError> {
        Ok(self
            .state()
            .pricings
            .values()
            .filter(|p| p.is_live() && p.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn list_opinions_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Opinion>, StoreError> {
        let state = self.state();
        let mut rows: Vec<Opinion> = state
            .opinions
            .values()
            .filter(|o| o.doctor_id == doctor_id && o.is_live())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
