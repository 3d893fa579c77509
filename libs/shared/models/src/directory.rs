// libs/shared/models/src/directory.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// SOFT DELETION
// ==============================================================================

/// Cross-cutting soft-deletion marker. Store adapters filter on this in one
/// place instead of repeating a deleted-at clause per query.
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_live(&self) -> bool {
        self.deleted_at().is_none()
    }
}

macro_rules! soft_deletable {
    ($($entity:ty),+ $(,)?) => {
        $(impl SoftDeletable for $entity {
            fn deleted_at(&self) -> Option<DateTime<Utc>> {
                self.deleted_at
            }
        })+
    };
}

// ==============================================================================
// MARKETPLACE ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speciality {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A service location. Virtual clinics have no physical address; the address
/// fields stay null and `is_virtual` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_virtual: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A doctor's priced service offering at one clinic. The canonical source of
/// an appointment's duration and cost at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub price: Decimal,
    pub currency: String,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Pricing {
    pub fn belongs_to(&self, doctor_id: Uuid, clinic_id: Uuid) -> bool {
        self.doctor_id == doctor_id && self.clinic_id == clinic_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opinion {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// 1 to 5.
    pub rating: i16,
    pub comment: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ==============================================================================
// JOIN RECORDS
// ==============================================================================
// Explicit two-column association records, composite-keyed on both parents.
// Owned jointly: removed when either parent goes away.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorClinic {
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSpeciality {
    pub doctor_id: Uuid,
    pub speciality_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

soft_deletable!(
    Doctor,
    Patient,
    Speciality,
    Clinic,
    Pricing,
    Opinion,
    DoctorClinic,
    DoctorSpeciality,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_and_retired_rows() {
        let mut clinic = Clinic {
            id: Uuid::new_v4(),
            name: "Centro Medico Norte".to_string(),
            address: Some("Av. Siempre Viva 742".to_string()),
            city: Some("Buenos Aires".to_string()),
            country: Some("AR".to_string()),
            is_virtual: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        assert!(clinic.is_live());

        clinic.deleted_at = Some(Utc::now());
        assert!(!clinic.is_live());
    }

    #[test]
    fn pricing_pair_membership() {
        let doctor_id = Uuid::new_v4();
        let clinic_id = Uuid::new_v4();
        let pricing = Pricing {
            id: Uuid::new_v4(),
            doctor_id,
            clinic_id,
            price: Decimal::new(4500, 2),
            currency: "EUR".to_string(),
            duration_minutes: 30,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        assert!(pricing.belongs_to(doctor_id, clinic_id));
        assert!(!pricing.belongs_to(Uuid::new_v4(), clinic_id));
        assert!(!pricing.belongs_to(doctor_id, Uuid::new_v4()));
    }
}
