use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::models::payment::{PendingPayment, PendingPaymentStatus};

/// Standing payment obligations. Created when a membership activates,
/// settled by the reconciler, voided when a member leaves.
#[derive(Clone)]
pub struct PendingPaymentBook {
    pending: Arc<Mutex<Vec<PendingPayment>>>,
}

impl PendingPaymentBook {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn create(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        group_name: String,
        amount: Decimal,
        due_date: DateTime<Utc>,
    ) -> PendingPayment {
        let obligation = PendingPayment {
            id: Uuid::new_v4(),
            user_id,
            group_id,
            group_name,
            amount,
            due_date,
            status: PendingPaymentStatus::Approved,
            created_at: Utc::now(),
        };
        let mut pending = self.pending.lock().unwrap();
        pending.push(obligation.clone());
        obligation
    }

    pub fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Option<PendingPayment> {
        let pending = self.pending.lock().unwrap();
        pending.iter().find(|p| p.id == id && p.user_id == user_id).cloned()
    }

    pub fn list_for_user(&self, user_id: Uuid) -> Vec<PendingPayment> {
        let pending = self.pending.lock().unwrap();
        pending.iter().filter(|p| p.user_id == user_id).cloned().collect()
    }

    /// Removes and returns the obligation; `None` when it was never created
    /// or already settled.
    pub fn settle(&self, id: Uuid) -> Option<PendingPayment> {
        let mut pending = self.pending.lock().unwrap();
        let index = pending.iter().position(|p| p.id == id)?;
        Some(pending.remove(index))
    }

    /// Drops any open obligation a cancelled member still carried.
    pub fn void_for_member(&self, group_id: Uuid, user_id: Uuid) {
        let mut pending = self.pending.lock().unwrap();
        pending.retain(|p| !(p.group_id == group_id && p.user_id == user_id));
    }

    /// Flags obligations past their due date. Invoked periodically.
    pub fn mark_overdue(&self, now: DateTime<Utc>) -> usize {
        let mut pending = self.pending.lock().unwrap();
        let mut flagged = 0;
        for obligation in pending.iter_mut() {
            if obligation.status == PendingPaymentStatus::Approved && obligation.due_date < now {
                obligation.status = PendingPaymentStatus::Overdue;
                flagged += 1;
            }
        }
        flagged
    }
}

impl Default for PendingPaymentBook {
    fn default() -> Self {
        Self::new()
    }
}
