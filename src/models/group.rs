use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::common::BillingCycle;
use crate::models::subscription::Subscription;

/// A capped-capacity pool sharing one subscription's cost. `available_slots`
/// only moves together with a membership transition: down on approval, up on
/// cancellation. Invariant: 0 <= available_slots <= total_slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub service_name: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub total_slots: u32,
    pub available_slots: u32,
    pub price_per_slot: Decimal,
    pub billing_cycle: BillingCycle,
    pub next_billing_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    pub subscription_id: Uuid,
    #[validate(range(min = 2, max = 10, message = "Slots must be between 2 and 10"))]
    pub total_slots: u32,
    pub price_per_slot: Decimal,
}

/// Browse listing entry, annotated per caller.
#[derive(Debug, Serialize)]
pub struct AvailableGroupView {
    #[serde(flatten)]
    pub group: Group,
    pub has_requested: bool,
}

/// Dashboard entry for a group the caller owns.
#[derive(Debug, Serialize)]
pub struct OwnedGroupView {
    #[serde(flatten)]
    pub group: Group,
    pub is_owner: bool,
    pub status: &'static str,
    pub members: u32,
}

impl Group {
    pub fn new(subscription: &Subscription, owner_name: String, total_slots: u32, price_per_slot: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscription_id: subscription.id,
            service_name: subscription.service_name.clone(),
            owner_id: subscription.owner_id,
            owner_name,
            total_slots,
            // The owner occupies one slot from the start.
            available_slots: total_slots - 1,
            price_per_slot,
            billing_cycle: subscription.billing_cycle,
            next_billing_at: subscription.next_billing_at,
            created_at: Utc::now(),
        }
    }

    pub fn member_count(&self) -> u32 {
        self.total_slots - self.available_slots
    }

    /// Whether anyone beyond the owner holds a slot. The owner's own seat is
    /// claimed at creation and never blocks deletion.
    pub fn has_joined_members(&self) -> bool {
        self.available_slots < self.total_slots - 1
    }

    /// Claims one slot. Returns false when the group is already full; the
    /// caller must hold the registry lock so check and decrement stay one step.
    pub fn reserve(&mut self) -> bool {
        if self.available_slots == 0 {
            return false;
        }
        self.available_slots -= 1;
        true
    }

    /// Returns one slot, capped at `total_slots`.
    pub fn release(&mut self) {
        if self.available_slots < self.total_slots {
            self.available_slots += 1;
        }
    }

    pub fn to_owned_view(&self) -> OwnedGroupView {
        OwnedGroupView {
            group: self.clone(),
            is_owner: true,
            status: if self.available_slots > 0 { "active" } else { "full" },
            members: self.member_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscription::CreateSubscriptionRequest;

    fn sample_group(total_slots: u32) -> Group {
        let subscription = Subscription::new(
            Uuid::new_v4(),
            CreateSubscriptionRequest {
                service_name: "Spotify Family".to_string(),
                total_cost: Decimal::new(179_00, 2),
                billing_cycle: BillingCycle::Monthly,
                next_billing_at: Utc::now(),
            },
        );
        Group::new(&subscription, "Alice Brown".to_string(), total_slots, Decimal::new(30_00, 2))
    }

    #[test]
    fn owner_takes_one_slot_at_creation() {
        let group = sample_group(4);
        assert_eq!(group.available_slots, 3);
        assert_eq!(group.member_count(), 1);
    }

    #[test]
    fn reserve_stops_at_zero() {
        let mut group = sample_group(2);
        assert!(group.reserve());
        assert_eq!(group.available_slots, 0);
        assert!(!group.reserve());
        assert_eq!(group.available_slots, 0);
    }

    #[test]
    fn release_caps_at_total() {
        let mut group = sample_group(2);
        group.release();
        assert_eq!(group.available_slots, 2);
        group.release();
        assert_eq!(group.available_slots, 2);
    }
}
