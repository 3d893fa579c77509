// libs/shared/utils/src/test_utils.rs
//
// Fixture builders shared by the cells' tests: entity factories plus a
// pre-seeded in-memory store covering the common booking topology (one
// doctor practicing at a physical and a virtual clinic, one active pricing
// per clinic, one patient).
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use shared_database::memory::MemoryStore;
use shared_models::account::User;
use shared_models::appointment::{Appointment, AppointmentStatus, AppointmentType};
use shared_models::directory::{Clinic, Doctor, Opinion, Patient, Pricing, Speciality};

pub fn minutes_from_now(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}

pub fn doctor(first_name: &str, last_name: &str) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        title: Some("Dr.".to_string()),
        bio: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn patient(first_name: &str, last_name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn user(email: &str, patient_id: Option<Uuid>, doctor_id: Option<Uuid>) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        patient_id,
        doctor_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn clinic(name: &str) -> Clinic {
    Clinic {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: Some("Av. Siempre Viva 742".to_string()),
        city: Some("Buenos Aires".to_string()),
        country: Some("AR".to_string()),
        is_virtual: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn virtual_clinic(name: &str) -> Clinic {
    Clinic {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: None,
        city: None,
        country: None,
        is_virtual: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn speciality(name: &str) -> Speciality {
    Speciality {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn pricing(doctor_id: Uuid, clinic_id: Uuid, duration_minutes: i32) -> Pricing {
    Pricing {
        id: Uuid::new_v4(),
        doctor_id,
        clinic_id,
        price: Decimal::new(4500, 2),
        currency: "EUR".to_string(),
        duration_minutes,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn opinion(doctor_id: Uuid, patient_id: Uuid, rating: i16) -> Opinion {
    Opinion {
        id: Uuid::new_v4(),
        doctor_id,
        patient_id,
        rating,
        comment: Some("Very thorough.".to_string()),
        is_anonymous: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn appointment(
    doctor_id: Uuid,
    patient_id: Uuid,
    clinic_id: Uuid,
    start_time: DateTime<Utc>,
    duration_minutes: i32,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        doctor_id,
        patient_id,
        clinic_id,
        pricing_id: None,
        start_time,
        end_time: start_time + Duration::minutes(duration_minutes as i64),
        duration_minutes,
        price: None,
        currency: None,
        appointment_type: AppointmentType::InPerson,
        status,
        notes: None,
        cancelled_by: None,
        cancellation_reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

/// Ids of the rows seeded by [`seeded_store`].
pub struct SchedulingFixtures {
    pub store: Arc<MemoryStore>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub virtual_clinic_id: Uuid,
    pub pricing_id: Uuid,
    pub online_pricing_id: Uuid,
    pub speciality_id: Uuid,
}

/// One doctor practicing at a physical and a virtual clinic, with one active
/// 30-minute pricing at the physical clinic and one active 20-minute pricing
/// at the virtual one, plus a patient to book with.
pub fn seeded_store() -> SchedulingFixtures {
    let store = Arc::new(MemoryStore::new());

    let doc = doctor("Ana", "Silva");
    let pat = patient("Bruno", "Costa");
    let physical = clinic("Centro Medico Norte");
    let online = virtual_clinic("Consulta Virtual");
    let cardiology = speciality("Cardiology");
    let in_person_pricing = pricing(doc.id, physical.id, 30);
    let online_pricing = pricing(doc.id, online.id, 20);

    let fixtures = SchedulingFixtures {
        doctor_id: doc.id,
        patient_id: pat.id,
        clinic_id: physical.id,
        virtual_clinic_id: online.id,
        pricing_id: in_person_pricing.id,
        online_pricing_id: online_pricing.id,
        speciality_id: cardiology.id,
        store: Arc::clone(&store),
    };

    store.insert_doctor(doc);
    store.insert_patient(pat);
    store.insert_clinic(physical);
    store.insert_clinic(online);
    store.insert_speciality(cardiology);
    store.insert_pricing(in_person_pricing);
    store.insert_pricing(online_pricing);
    store.link_doctor_clinic(fixtures.doctor_id, fixtures.clinic_id);
    store.link_doctor_clinic(fixtures.doctor_id, fixtures.virtual_clinic_id);
    store.link_doctor_speciality(fixtures.doctor_id, fixtures.speciality_id);

    fixtures
}
