use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::common::BillingCycle;

/// A paid subscription owned by one user. At most one active sharing group
/// can back it, tracked by `is_shared`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub service_name: String,
    pub total_cost: Decimal,
    pub billing_cycle: BillingCycle,
    pub next_billing_at: DateTime<Utc>,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 1, message = "Service name is required"))]
    pub service_name: String,
    pub total_cost: Decimal,
    pub billing_cycle: BillingCycle,
    pub next_billing_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubscriptionRequest {
    #[validate(length(min = 1, message = "Service name is required"))]
    pub service_name: String,
    pub total_cost: Decimal,
    pub billing_cycle: BillingCycle,
    pub next_billing_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(owner_id: Uuid, request: CreateSubscriptionRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            service_name: request.service_name,
            total_cost: request.total_cost,
            billing_cycle: request.billing_cycle,
            next_billing_at: request.next_billing_at,
            is_shared: false,
            created_at: now,
            updated_at: now,
        }
    }
}
