// libs/shared/database/src/postgrest.rs
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::account::User;
use shared_models::appointment::{Appointment, AppointmentStatus, NewAppointment};
use shared_models::directory::{
    Clinic, Doctor, DoctorClinic, DoctorSpeciality, Opinion, Patient, Pricing, Speciality,
};

use crate::store::{
    CancellationStamp, RescheduleOutcome, SchedulingStore, StoreError, TransitionOutcome,
};

/// PostgREST-backed entity store. Plain table reads go through `/rest/v1/`;
/// the three guarded writes go through stored procedures under `/rest/v1/rpc/`
/// so the slot-exclusion check and the row write happen inside one database
/// transaction. A plain insert here would reopen the double-booking race.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SlotConflictBody {
    conflicting_appointment_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct GuardedUpdateBody {
    applied: bool,
    appointment: Appointment,
}

impl PostgrestStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
            timeout: Duration::from_secs(config.store_timeout_seconds),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("Content-Type", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Unavailable(e.to_string())
            }
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        if !status.is_success() {
            error!("store rejected request ({}): {}", status, body);
            return Err(StoreError::Backend {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// Table read with the cross-cutting soft-deletion filter. Every row-level
    /// query in this adapter goes through here, so `deleted_at=is.null` is
    /// stated exactly once.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[String],
    ) -> Result<Vec<T>, StoreError> {
        let mut query = filters.to_vec();
        query.push("deleted_at=is.null".to_string());
        let path = format!("/rest/v1/{}?{}", table, query.join("&"));
        debug!("store select: {}", path);

        let response = self.send(self.request(Method::GET, &path)).await?;
        Self::decode(response).await
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[String],
    ) -> Result<Option<T>, StoreError> {
        let mut filters = filters.to_vec();
        filters.push("limit=1".to_string());
        let mut rows: Vec<T> = self.select(table, &filters).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn get_by_id<T: DeserializeOwned>(
        &self,
        table: &str,
        id: Uuid,
    ) -> Result<Option<T>, StoreError> {
        self.select_one(table, &[format!("id=eq.{}", id)]).await
    }

    /// Guarded-write RPC call. `409 Conflict` carries the winning appointment
    /// id and maps to `SlotTaken`; `404` means no live row with the given id.
    async fn rpc(&self, name: &str, body: Value) -> Result<Option<Response>, StoreError> {
        let path = format!("/rest/v1/rpc/{}", name);
        debug!("store rpc: {}", path);

        let response = self
            .send(self.request(Method::POST, &path).json(&body))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::CONFLICT => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| StoreError::Malformed(e.to_string()))?;
                let conflict: SlotConflictBody = serde_json::from_str(&body)
                    .map_err(|e| StoreError::Malformed(e.to_string()))?;
                Err(StoreError::SlotTaken {
                    conflicting_appointment_id: conflict.conflicting_appointment_id,
                })
            }
            _ => Ok(Some(response)),
        }
    }

    fn encode_instant(instant: DateTime<Utc>) -> String {
        urlencoding::encode(&instant.to_rfc3339()).into_owned()
    }

    fn id_list(ids: &[Uuid]) -> String {
        let joined = ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("id=in.({})", joined)
    }
}

#[async_trait]
impl SchedulingStore for PostgrestStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.get_by_id("users", id).await
    }

    async fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        self.get_by_id("doctors", id).await
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        self.get_by_id("patients", id).await
    }

    async fn get_clinic(&self, id: Uuid) -> Result<Option<Clinic>, StoreError> {
        self.get_by_id("clinics", id).await
    }

    async fn get_pricing(&self, id: Uuid) -> Result<Option<Pricing>, StoreError> {
        self.get_by_id("pricings", id).await
    }

    async fn get_doctor_clinic(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<Option<DoctorClinic>, StoreError> {
        self.select_one(
            "doctor_clinics",
            &[
                format!("doctor_id=eq.{}", doctor_id),
                format!("clinic_id=eq.{}", clinic_id),
            ],
        )
        .await
    }

    async fn list_pricings_for_pair(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
    ) -> Result<Vec<Pricing>, StoreError> {
        self.select(
            "pricings",
            &[
                format!("doctor_id=eq.{}", doctor_id),
                format!("clinic_id=eq.{}", clinic_id),
            ],
        )
        .await
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        self.get_by_id("appointments", id).await
    }

    async fn list_appointments_for_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError> {
        // Half-open intersection with [from, to): a row intersects iff it ends
        // after `from` and starts before `to`.
        let mut filters = vec![
            format!("doctor_id=eq.{}", doctor_id),
            "status=neq.cancelled".to_string(),
            format!("end_time=gt.{}", Self::encode_instant(from)),
            format!("start_time=lt.{}", Self::encode_instant(to)),
            "order=start_time.asc".to_string(),
        ];
        if let Some(exclude) = exclude {
            filters.push(format!("id=neq.{}", exclude));
        }

        self.select("appointments", &filters).await
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.select(
            "appointments",
            &[
                format!("patient_id=eq.{}", patient_id),
                "order=start_time.asc".to_string(),
            ],
        )
        .await
    }

    async fn create_appointment(&self, new: &NewAppointment) -> Result<Appointment, StoreError> {
        let response = self
            .rpc("book_appointment", json!(new))
            .await?
            .ok_or_else(|| StoreError::Malformed("book_appointment returned 404".to_string()))?;
        Self::decode(response).await
    }

    async fn transition_appointment(
        &self,
        id: Uuid,
        allowed_from: &[AppointmentStatus],
        to: AppointmentStatus,
        stamp: Option<CancellationStamp>,
    ) -> Result<Option<TransitionOutcome>, StoreError> {
        let body = json!({
            "appointment_id": id,
            "allowed_from": allowed_from,
            "to_status": to,
            "cancelled_by": stamp.as_ref().map(|s| s.cancelled_by),
            "cancellation_reason": stamp.as_ref().and_then(|s| s.reason.clone()),
        });

        let Some(response) = self.rpc("transition_appointment", body).await? else {
            return Ok(None);
        };
        let update: GuardedUpdateBody = Self::decode(response).await?;
        Ok(Some(if update.applied {
            TransitionOutcome::Applied(update.appointment)
        } else {
            TransitionOutcome::Refused(update.appointment)
        }))
    }

    async fn reschedule_appointment(
        &self,
        id: Uuid,
        allowed_from: &[AppointmentStatus],
        new_start: DateTime<Utc>,
    ) -> Result<Option<RescheduleOutcome>, StoreError> {
        let body = json!({
            "appointment_id": id,
            "allowed_from": allowed_from,
            "new_start": new_start,
        });

        let Some(response) = self.rpc("move_appointment", body).await? else {
            return Ok(None);
        };
        let update: GuardedUpdateBody = Self::decode(response).await?;
        Ok(Some(if update.applied {
            RescheduleOutcome::Applied(update.appointment)
        } else {
            RescheduleOutcome::Refused(update.appointment)
        }))
    }

    async fn list_doctors(
        &self,
        speciality_id: Option<Uuid>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Doctor>, StoreError> {
        let paging = [
            format!("limit={}", limit),
            format!("offset={}", offset),
            "order=last_name.asc".to_string(),
        ];

        match speciality_id {
            None => self.select("doctors", &paging).await,
            Some(speciality_id) => {
                let joins: Vec<DoctorSpeciality> = self
                    .select(
                        "doctor_specialities",
                        &[format!("speciality_id=eq.{}", speciality_id)],
                    )
                    .await?;
                if joins.is_empty() {
                    return Ok(Vec::new());
                }

                let doctor_ids: Vec<Uuid> = joins.iter().map(|j| j.doctor_id).collect();
                let mut filters = vec![Self::id_list(&doctor_ids)];
                filters.extend(paging);
                self.select("doctors", &filters).await
            }
        }
    }

    async fn list_clinics(&self, limit: u32, offset: u32) -> Result<Vec<Clinic>, StoreError> {
        self.select(
            "clinics",
            &[
                format!("limit={}", limit),
                format!("offset={}", offset),
                "order=name.asc".to_string(),
            ],
        )
        .await
    }

    async fn list_specialities_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Speciality>, StoreError> {
        let joins: Vec<DoctorSpeciality> = self
            .select(
                "doctor_specialities",
                &[format!("doctor_id=eq.{}", doctor_id)],
            )
            .await?;
        if joins.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = joins.iter().map(|j| j.speciality_id).collect();
        self.select("specialities", &[Self::id_list(&ids)]).await
    }

    async fn list_clinics_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Clinic>, StoreError> {
        let joins: Vec<DoctorClinic> = self
            .select("doctor_clinics", &[format!("doctor_id=eq.{}", doctor_id)])
            .await?;
        if joins.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = joins.iter().map(|j| j.clinic_id).collect();
        self.select("clinics", &[Self::id_list(&ids)]).await
    }

    async fn list_pricings_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Pricing>, StoreError> {
        self.select("pricings", &[format!("doctor_id=eq.{}", doctor_id)])
            .await
    }

    async fn list_opinions_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Opinion>, StoreError> {
        self.select(
            "opinions",
            &[
                format!("doctor_id=eq.{}", doctor_id),
                "order=created_at.desc".to_string(),
            ],
        )
        .await
    }
}
