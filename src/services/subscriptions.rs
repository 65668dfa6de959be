use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::subscription::{CreateSubscriptionRequest, Subscription, UpdateSubscriptionRequest};

/// Owns subscription records. In-memory stand-in for a relational table;
/// the `Arc<Mutex<_>>` is the transaction boundary.
#[derive(Clone)]
pub struct SubscriptionRegistry {
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn create(&self, owner_id: Uuid, request: CreateSubscriptionRequest) -> Result<Subscription, ApiError> {
        if request.total_cost <= Decimal::ZERO {
            return Err(ApiError::InvalidInput("Total cost must be greater than 0".to_string()));
        }
        let subscription = Subscription::new(owner_id, request);
        let mut subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.push(subscription.clone());
        log::info!("created subscription {} ({})", subscription.id, subscription.service_name);
        Ok(subscription)
    }

    pub fn list_for_owner(&self, owner_id: Uuid) -> Vec<Subscription> {
        let subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.iter().filter(|s| s.owner_id == owner_id).cloned().collect()
    }

    pub fn get(&self, subscription_id: Uuid) -> Option<Subscription> {
        let subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.iter().find(|s| s.id == subscription_id).cloned()
    }

    pub fn get_owned(&self, subscription_id: Uuid, owner_id: Uuid) -> Result<Subscription, ApiError> {
        self.get(subscription_id)
            .filter(|s| s.owner_id == owner_id)
            .ok_or(ApiError::NotFound("subscription"))
    }

    pub fn update(
        &self,
        subscription_id: Uuid,
        owner_id: Uuid,
        request: UpdateSubscriptionRequest,
    ) -> Result<Subscription, ApiError> {
        if request.total_cost <= Decimal::ZERO {
            return Err(ApiError::InvalidInput("Total cost must be greater than 0".to_string()));
        }
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id && s.owner_id == owner_id)
            .ok_or(ApiError::NotFound("subscription"))?;

        subscription.service_name = request.service_name;
        subscription.total_cost = request.total_cost;
        subscription.billing_cycle = request.billing_cycle;
        subscription.next_billing_at = request.next_billing_at;
        subscription.updated_at = Utc::now();
        Ok(subscription.clone())
    }

    /// Deleting a shared subscription is rejected: its group still holds
    /// members (or at least a live listing) that reference it.
    pub fn delete(&self, subscription_id: Uuid, owner_id: Uuid) -> Result<(), ApiError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let index = subscriptions
            .iter()
            .position(|s| s.id == subscription_id && s.owner_id == owner_id)
            .ok_or(ApiError::NotFound("subscription"))?;

        if subscriptions[index].is_shared {
            return Err(ApiError::Conflict(
                "Cannot delete a subscription that is being shared. Remove all members first.".to_string(),
            ));
        }

        subscriptions.remove(index);
        Ok(())
    }

    /// Atomic check-and-set used by group creation: the subscription must
    /// exist, belong to `owner_id` and not already back another group.
    pub fn mark_shared_if_unshared(&self, subscription_id: Uuid, owner_id: Uuid) -> Result<Subscription, ApiError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id)
            .ok_or(ApiError::NotFound("subscription"))?;

        if subscription.owner_id != owner_id {
            return Err(ApiError::Conflict("Subscription is not owned by you".to_string()));
        }
        if subscription.is_shared {
            return Err(ApiError::Conflict("Subscription is already being shared".to_string()));
        }

        subscription.is_shared = true;
        subscription.updated_at = Utc::now();
        Ok(subscription.clone())
    }

    pub fn mark_shared(&self, subscription_id: Uuid, shared: bool) {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(subscription) = subscriptions.iter_mut().find(|s| s.id == subscription_id) {
            subscription.is_shared = shared;
            subscription.updated_at = Utc::now();
        }
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::BillingCycle;

    fn request(name: &str) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            service_name: name.to_string(),
            total_cost: Decimal::new(649_00, 2),
            billing_cycle: BillingCycle::Monthly,
            next_billing_at: Utc::now(),
        }
    }

    #[test]
    fn mark_shared_if_unshared_is_single_shot() {
        let registry = SubscriptionRegistry::new();
        let owner = Uuid::new_v4();
        let subscription = registry.create(owner, request("Netflix Premium")).unwrap();

        assert!(registry.mark_shared_if_unshared(subscription.id, owner).is_ok());
        let second = registry.mark_shared_if_unshared(subscription.id, owner);
        assert!(matches!(second, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn mark_shared_rejects_foreign_owner() {
        let registry = SubscriptionRegistry::new();
        let subscription = registry.create(Uuid::new_v4(), request("Netflix Premium")).unwrap();
        let result = registry.mark_shared_if_unshared(subscription.id, Uuid::new_v4());
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn delete_rejects_shared_subscription() {
        let registry = SubscriptionRegistry::new();
        let owner = Uuid::new_v4();
        let subscription = registry.create(owner, request("Netflix Premium")).unwrap();
        registry.mark_shared(subscription.id, true);

        let result = registry.delete(subscription.id, owner);
        assert!(matches!(result, Err(ApiError::Conflict(_))));

        registry.mark_shared(subscription.id, false);
        assert!(registry.delete(subscription.id, owner).is_ok());
        assert!(registry.get(subscription.id).is_none());
    }
}
