use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::membership::{DecideAction, JoinRequestView, Membership, MembershipStatus};
use crate::models::user::AuthUser;
use crate::services::groups::GroupRegistry;
use crate::services::pending_payments::PendingPaymentBook;

/// Owns membership records and their state machine:
/// pending -> active | rejected, active -> cancelled.
///
/// Every transition that pairs with a slot change runs entirely under the
/// memberships lock, with the groups lock acquired nested inside. No code
/// path nests the two in the other order, and the obligation book is only
/// touched with both released.
#[derive(Clone)]
pub struct MembershipLedger {
    memberships: Arc<Mutex<Vec<Membership>>>,
    groups: GroupRegistry,
    obligations: PendingPaymentBook,
}

impl MembershipLedger {
    pub fn new(groups: GroupRegistry, obligations: PendingPaymentBook) -> Self {
        Self {
            memberships: Arc::new(Mutex::new(Vec::new())),
            groups,
            obligations,
        }
    }

    pub fn request_join(&self, user: &AuthUser, group_id: Uuid) -> Result<Membership, ApiError> {
        let group = self.groups.get(group_id).ok_or(ApiError::NotFound("group"))?;
        if group.owner_id == user.user_id {
            return Err(ApiError::InvalidInput("You already own this group".to_string()));
        }

        let mut memberships = self.memberships.lock().unwrap();
        let already_requested = memberships
            .iter()
            .any(|m| m.group_id == group_id && m.user_id == user.user_id && m.status.is_open());
        if already_requested {
            return Err(ApiError::Conflict(
                "You have already requested to join this group".to_string(),
            ));
        }

        let membership = Membership::new(group_id, user);
        memberships.push(membership.clone());
        log::info!("join request {} for group {} by {}", membership.id, group_id, user.user_id);
        Ok(membership)
    }

    /// Owner decision on a pending request. Approval reserves a slot and
    /// flips the membership active as one step: the memberships lock is held
    /// across the reserve, so of two racing approvals for the last slot
    /// exactly one succeeds and the other sees `GroupFull` with its request
    /// left pending. Activation also creates the member's first obligation.
    pub fn decide(&self, request_id: Uuid, decider: &AuthUser, action: DecideAction) -> Result<Membership, ApiError> {
        let (membership, group) = {
            let mut memberships = self.memberships.lock().unwrap();
            let membership = memberships
                .iter_mut()
                .find(|m| m.id == request_id)
                .ok_or(ApiError::NotFound("request"))?;

            let group = self
                .groups
                .get(membership.group_id)
                .ok_or(ApiError::NotFound("group"))?;
            if group.owner_id != decider.user_id {
                return Err(ApiError::Forbidden);
            }
            if membership.status != MembershipStatus::Pending {
                return Err(ApiError::Conflict("Request has already been decided".to_string()));
            }

            match action {
                DecideAction::Approve => {
                    // On GroupFull the `?` leaves the membership pending.
                    self.groups.reserve_slot(membership.group_id)?;
                    membership.status = MembershipStatus::Active;
                }
                DecideAction::Reject => {
                    membership.status = MembershipStatus::Rejected;
                }
            }
            membership.decided_at = Some(Utc::now());
            (membership.clone(), group)
        };

        if membership.status == MembershipStatus::Active {
            self.obligations.create(
                membership.user_id,
                group.id,
                group.service_name.clone(),
                group.price_per_slot,
                group.next_billing_at,
            );
        }
        log::info!("request {} {:?} by owner {}", request_id, membership.status, decider.user_id);
        Ok(membership)
    }

    /// Pending requests against groups the owner runs, joined with the group
    /// name for the owner's inbox.
    pub fn list_for_owner(&self, owner_id: Uuid) -> Vec<JoinRequestView> {
        let memberships = self.memberships.lock().unwrap();
        memberships
            .iter()
            .filter(|m| m.status == MembershipStatus::Pending)
            .filter_map(|m| {
                let group = self.groups.get(m.group_id)?;
                if group.owner_id != owner_id {
                    return None;
                }
                Some(JoinRequestView {
                    id: m.id,
                    group_id: m.group_id,
                    group_name: group.service_name,
                    user_name: m.user_name.clone(),
                    user_email: m.user_email.clone(),
                    status: m.status,
                    requested_at: m.created_at,
                })
            })
            .collect()
    }

    pub fn active_group_ids_for(&self, user_id: Uuid) -> Vec<Uuid> {
        let memberships = self.memberships.lock().unwrap();
        memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.status == MembershipStatus::Active)
            .map(|m| m.group_id)
            .collect()
    }

    pub fn has_open_request(&self, group_id: Uuid, user_id: Uuid) -> bool {
        let memberships = self.memberships.lock().unwrap();
        memberships
            .iter()
            .any(|m| m.group_id == group_id && m.user_id == user_id && m.status.is_open())
    }

    pub fn is_active(&self, group_id: Uuid, user_id: Uuid) -> bool {
        let memberships = self.memberships.lock().unwrap();
        memberships
            .iter()
            .any(|m| m.group_id == group_id && m.user_id == user_id && m.status == MembershipStatus::Active)
    }

    /// Cancels an active membership: the member themself or the group owner
    /// may do it. The slot is released under the same memberships lock and
    /// any open obligation is voided.
    pub fn remove_member(&self, group_id: Uuid, target_user_id: Uuid, requester_id: Uuid) -> Result<Membership, ApiError> {
        let membership = {
            let mut memberships = self.memberships.lock().unwrap();
            let group = self.groups.get(group_id).ok_or(ApiError::NotFound("group"))?;
            if requester_id != target_user_id && requester_id != group.owner_id {
                return Err(ApiError::Forbidden);
            }

            let membership = memberships
                .iter_mut()
                .find(|m| m.group_id == group_id && m.user_id == target_user_id && m.status == MembershipStatus::Active)
                .ok_or(ApiError::NotFound("membership"))?;

            membership.status = MembershipStatus::Cancelled;
            membership.decided_at = Some(Utc::now());
            self.groups.release_slot(group_id);
            membership.clone()
        };

        self.obligations.void_for_member(group_id, target_user_id);
        log::info!("membership {} cancelled by {}", membership.id, requester_id);
        Ok(membership)
    }
}
