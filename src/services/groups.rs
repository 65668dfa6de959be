use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::group::{CreateGroupRequest, Group};
use crate::models::user::AuthUser;
use crate::services::subscriptions::SubscriptionRegistry;

/// Holds sharing-group records and owns every `available_slots` mutation.
///
/// Lock discipline: the groups lock may be taken while the memberships lock
/// is held (ledger -> registry), never the other way around.
#[derive(Clone)]
pub struct GroupRegistry {
    groups: Arc<Mutex<Vec<Group>>>,
    subscriptions: SubscriptionRegistry,
}

impl GroupRegistry {
    pub fn new(subscriptions: SubscriptionRegistry) -> Self {
        Self {
            groups: Arc::new(Mutex::new(Vec::new())),
            subscriptions,
        }
    }

    pub fn create_group(&self, owner: &AuthUser, request: CreateGroupRequest) -> Result<Group, ApiError> {
        if !(2..=10).contains(&request.total_slots) {
            return Err(ApiError::InvalidInput("Slots must be between 2 and 10".to_string()));
        }
        if request.price_per_slot <= Decimal::ZERO {
            return Err(ApiError::InvalidInput("Price per slot must be greater than 0".to_string()));
        }

        // Claims the subscription for sharing; fails on a foreign or
        // already-shared subscription before any group state exists.
        let subscription = self
            .subscriptions
            .mark_shared_if_unshared(request.subscription_id, owner.user_id)?;

        let group = Group::new(&subscription, owner.name.clone(), request.total_slots, request.price_per_slot);
        let mut groups = self.groups.lock().unwrap();
        groups.push(group.clone());
        log::info!(
            "created group {} for {} ({} slots)",
            group.id,
            group.service_name,
            group.total_slots
        );
        Ok(group)
    }

    pub fn get(&self, group_id: Uuid) -> Option<Group> {
        let groups = self.groups.lock().unwrap();
        groups.iter().find(|g| g.id == group_id).cloned()
    }

    pub fn list_available(&self, exclude_owner_id: Uuid) -> Vec<Group> {
        let groups = self.groups.lock().unwrap();
        groups.iter().filter(|g| g.owner_id != exclude_owner_id).cloned().collect()
    }

    pub fn owned_by(&self, owner_id: Uuid) -> Vec<Group> {
        let groups = self.groups.lock().unwrap();
        groups.iter().filter(|g| g.owner_id == owner_id).cloned().collect()
    }

    /// Atomic check-and-decrement of one slot. Check and write happen under
    /// the same lock so two callers can never both claim the last seat.
    pub fn reserve_slot(&self, group_id: Uuid) -> Result<(), ApiError> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(ApiError::NotFound("group"))?;
        if group.reserve() {
            Ok(())
        } else {
            Err(ApiError::GroupFull)
        }
    }

    /// Returns one slot, capped at the group's total.
    pub fn release_slot(&self, group_id: Uuid) {
        let mut groups = self.groups.lock().unwrap();
        match groups.iter_mut().find(|g| g.id == group_id) {
            Some(group) => group.release(),
            None => log::warn!("release_slot on unknown group {}", group_id),
        }
    }

    pub fn delete_group(&self, group_id: Uuid, requester_id: Uuid) -> Result<(), ApiError> {
        let subscription_id;
        {
            let mut groups = self.groups.lock().unwrap();
            let index = groups
                .iter()
                .position(|g| g.id == group_id)
                .ok_or(ApiError::NotFound("group"))?;

            if groups[index].owner_id != requester_id {
                return Err(ApiError::Forbidden);
            }
            if groups[index].has_joined_members() {
                return Err(ApiError::Conflict(
                    "Cannot delete a group that has active members".to_string(),
                ));
            }

            subscription_id = groups[index].subscription_id;
            groups.remove(index);
        }
        self.subscriptions.mark_shared(subscription_id, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::BillingCycle;
    use crate::models::subscription::CreateSubscriptionRequest;
    use chrono::Utc;

    fn owner() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            name: "John Doe".to_string(),
            email: "john.doe@thapar.edu".to_string(),
        }
    }

    fn registry_with_group(total_slots: u32) -> (GroupRegistry, Group) {
        let subscriptions = SubscriptionRegistry::new();
        let owner = owner();
        let subscription = subscriptions
            .create(
                owner.user_id,
                CreateSubscriptionRequest {
                    service_name: "Netflix Premium".to_string(),
                    total_cost: Decimal::new(649_00, 2),
                    billing_cycle: BillingCycle::Monthly,
                    next_billing_at: Utc::now(),
                },
            )
            .unwrap();

        let registry = GroupRegistry::new(subscriptions);
        let group = registry
            .create_group(
                &owner,
                CreateGroupRequest {
                    subscription_id: subscription.id,
                    total_slots,
                    price_per_slot: Decimal::new(199_00, 2),
                },
            )
            .unwrap();
        (registry, group)
    }

    #[test]
    fn create_marks_subscription_shared_once() {
        let (registry, group) = registry_with_group(4);
        assert_eq!(group.available_slots, 3);

        let again = registry.create_group(
            &AuthUser {
                user_id: group.owner_id,
                name: group.owner_name.clone(),
                email: "john.doe@thapar.edu".to_string(),
            },
            CreateGroupRequest {
                subscription_id: group.subscription_id,
                total_slots: 4,
                price_per_slot: Decimal::new(199_00, 2),
            },
        );
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn create_rejects_nonpositive_price() {
        let subscriptions = SubscriptionRegistry::new();
        let registry = GroupRegistry::new(subscriptions);
        let result = registry.create_group(
            &owner(),
            CreateGroupRequest {
                subscription_id: Uuid::new_v4(),
                total_slots: 4,
                price_per_slot: Decimal::ZERO,
            },
        );
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn reserve_slot_exhausts_then_fails() {
        let (registry, group) = registry_with_group(3);
        assert!(registry.reserve_slot(group.id).is_ok());
        assert!(registry.reserve_slot(group.id).is_ok());
        assert!(matches!(registry.reserve_slot(group.id), Err(ApiError::GroupFull)));
        assert_eq!(registry.get(group.id).unwrap().available_slots, 0);
    }

    #[test]
    fn release_slot_never_exceeds_total() {
        let (registry, group) = registry_with_group(3);
        registry.release_slot(group.id);
        registry.release_slot(group.id);
        assert_eq!(registry.get(group.id).unwrap().available_slots, 3);
    }

    #[test]
    fn delete_rejects_group_with_members() {
        let (registry, group) = registry_with_group(3);
        registry.reserve_slot(group.id).unwrap();
        let result = registry.delete_group(group.id, group.owner_id);
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn delete_empty_group_unshares_subscription() {
        let (registry, group) = registry_with_group(3);
        assert!(registry.delete_group(group.id, group.owner_id).is_ok());
        assert!(registry.get(group.id).is_none());
        assert!(!registry.subscriptions.get(group.subscription_id).unwrap().is_shared);
    }

    #[test]
    fn delete_requires_owner() {
        let (registry, group) = registry_with_group(3);
        let result = registry.delete_group(group.id, Uuid::new_v4());
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }
}
