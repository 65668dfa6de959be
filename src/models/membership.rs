use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::AuthUser;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Active,
    Rejected,
    Cancelled,
}

impl MembershipStatus {
    /// Pending and active requests block a second request for the same
    /// (group, user) pair; rejected and cancelled ones do not.
    pub fn is_open(&self) -> bool {
        matches!(self, MembershipStatus::Pending | MembershipStatus::Active)
    }
}

/// A user's join request/relationship to a group. Transitions:
/// pending -> active (approve), pending -> rejected (reject),
/// active -> cancelled (member leaves or owner removes them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Membership {
    pub fn new(group_id: Uuid, user: &AuthUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id: user.user_id,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            status: MembershipStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JoinGroupRequest {
    pub group_id: Uuid,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecideAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub action: DecideAction,
}

/// Owner-inbox row: a pending request joined with its group's name.
#[derive(Debug, Serialize)]
pub struct JoinRequestView {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub user_name: String,
    pub user_email: String,
    pub status: MembershipStatus,
    pub requested_at: DateTime<Utc>,
}
