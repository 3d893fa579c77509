// libs/scheduling-cell/src/services/pricing.rs
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::store::SchedulingStore;
use shared_models::directory::Pricing;

use crate::models::{PricingResolution, PricingSnapshot, SchedulingError};

/// Consultation length applied when a doctor/clinic pair carries no active
/// pricing.
pub const DEFAULT_CONSULTATION_MINUTES: i32 = 30;

/// Resolves the priced service governing a booking. Read-only.
pub struct PricingService {
    store: Arc<dyn SchedulingStore>,
}

impl PricingService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// With an explicit id: the row must exist, belong to the pair and be
    /// active. Without one: exactly one active pricing for the pair is used;
    /// several is ambiguous and rejected rather than silently picked; none
    /// falls back to the default consultation length.
    pub async fn resolve(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
        pricing_id: Option<Uuid>,
    ) -> Result<PricingResolution, SchedulingError> {
        match pricing_id {
            Some(pricing_id) => {
                let pricing = self
                    .store
                    .get_pricing(pricing_id)
                    .await?
                    .ok_or(SchedulingError::PricingNotFound(pricing_id))?;

                if !pricing.belongs_to(doctor_id, clinic_id) {
                    return Err(SchedulingError::PricingMismatch(pricing_id));
                }
                if !pricing.is_active {
                    return Err(SchedulingError::PricingInactive(pricing_id));
                }

                Ok(PricingResolution::Priced(Self::snapshot(&pricing)))
            }
            None => {
                let mut active: Vec<Pricing> = self
                    .store
                    .list_pricings_for_pair(doctor_id, clinic_id)
                    .await?
                    .into_iter()
                    .filter(|p| p.is_active)
                    .collect();

                match active.len() {
                    0 => {
                        debug!(
                            "no active pricing for doctor {} at clinic {}, using default length",
                            doctor_id, clinic_id
                        );
                        Ok(PricingResolution::Unpriced {
                            duration_minutes: DEFAULT_CONSULTATION_MINUTES,
                        })
                    }
                    1 => Ok(PricingResolution::Priced(Self::snapshot(&active.remove(0)))),
                    _ => Err(SchedulingError::AmbiguousPricing),
                }
            }
        }
    }

    fn snapshot(pricing: &Pricing) -> PricingSnapshot {
        PricingSnapshot {
            pricing_id: pricing.id,
            price: pricing.price,
            currency: pricing.currency.clone(),
            duration_minutes: pricing.duration_minutes,
        }
    }
}
