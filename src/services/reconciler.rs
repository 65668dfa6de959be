use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::common::BillingCycle;
use crate::models::payment::{
    from_minor_units, to_minor_units, OrderNotes, OrderResponse, Payment, PaymentEntity, PaymentStatus,
    UnmatchedEvent, WebhookEnvelope,
};
use crate::models::user::AuthUser;
use crate::services::groups::GroupRegistry;
use crate::services::membership::MembershipLedger;
use crate::services::pending_payments::PendingPaymentBook;
use crate::services::razorpay::RazorpayClient;
use crate::services::subscriptions::SubscriptionRegistry;

/// Outcome of a webhook delivery. All of these are HTTP 200 to the gateway;
/// only a bad signature or an unparseable body is bounced.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WebhookOutcome {
    Processed,
    Duplicate,
    Unmatched,
    Ignored,
}

/// Consumes gateway webhook events and settles obligations.
///
/// Canonical ordering: approval activates the membership, reserves the slot
/// and creates the obligation; a captured payment only ever settles that
/// obligation. The reconciler never mutates `available_slots`, so duplicate
/// or out-of-order delivery cannot double-book a seat.
#[derive(Clone)]
pub struct PaymentReconciler {
    payments: Arc<Mutex<Vec<Payment>>>,
    unmatched: Arc<Mutex<Vec<UnmatchedEvent>>>,
    obligations: PendingPaymentBook,
    memberships: MembershipLedger,
    groups: GroupRegistry,
    subscriptions: SubscriptionRegistry,
    gateway: RazorpayClient,
    currency: String,
}

impl PaymentReconciler {
    pub fn new(
        obligations: PendingPaymentBook,
        memberships: MembershipLedger,
        groups: GroupRegistry,
        subscriptions: SubscriptionRegistry,
        gateway: RazorpayClient,
        currency: String,
    ) -> Self {
        Self {
            payments: Arc::new(Mutex::new(Vec::new())),
            unmatched: Arc::new(Mutex::new(Vec::new())),
            obligations,
            memberships,
            groups,
            subscriptions,
            gateway,
            currency,
        }
    }

    /// Creates a gateway order for one of the caller's open obligations.
    pub async fn create_order(&self, user: &AuthUser, pending_payment_id: Uuid) -> Result<OrderResponse, ApiError> {
        let pending = self
            .obligations
            .find_for_user(pending_payment_id, user.user_id)
            .ok_or(ApiError::NotFound("pending payment"))?;

        let amount = to_minor_units(pending.amount)
            .ok_or_else(|| ApiError::Internal(format!("amount {} out of range", pending.amount)))?;
        let receipt = format!("rcpt_{}", pending.id.simple());
        let notes = OrderNotes {
            user_id: user.user_id,
            group_id: pending.group_id,
            pending_payment_id: pending.id,
        };

        let order_id = self
            .gateway
            .create_order(amount, &self.currency, &receipt, &notes)
            .await
            .map_err(|e| ApiError::Internal(format!("gateway order creation failed: {:#}", e)))?;

        Ok(OrderResponse {
            order_id,
            amount,
            currency: self.currency.clone(),
            group_name: pending.group_name,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
        })
    }

    /// Processes one webhook delivery against the raw body and its signature
    /// header. Signature first, then idempotency, then settlement; the
    /// duplicate check and the payment insert happen under one lock so a
    /// concurrent redelivery cannot slip between them.
    pub fn process_webhook(&self, body: &[u8], signature: Option<&str>) -> Result<WebhookOutcome, ApiError> {
        let signature = signature.ok_or(ApiError::InvalidSignature)?;
        if !self.gateway.verify_webhook_signature(body, signature) {
            return Err(ApiError::InvalidSignature);
        }

        let envelope: WebhookEnvelope = serde_json::from_slice(body)
            .map_err(|e| ApiError::InvalidInput(format!("malformed webhook body: {}", e)))?;
        if envelope.event != "payment.captured" {
            log::info!("ignoring webhook event {}", envelope.event);
            return Ok(WebhookOutcome::Ignored);
        }
        let entity = envelope.payload.payment.entity;

        let mut payments = self.payments.lock().unwrap();
        if payments.iter().any(|p| p.gateway_payment_id == entity.id) {
            log::info!("duplicate delivery of payment {} ignored", entity.id);
            return Ok(WebhookOutcome::Duplicate);
        }

        let notes = match entity.notes.as_ref().and_then(OrderNotes::from_value) {
            Some(notes) => notes,
            None => {
                self.record_unmatched(&entity, "missing or malformed order notes");
                return Ok(WebhookOutcome::Unmatched);
            }
        };

        let pending = match self.obligations.settle(notes.pending_payment_id) {
            Some(pending) => pending,
            None => {
                self.record_unmatched(&entity, "no matching pending payment");
                return Ok(WebhookOutcome::Unmatched);
            }
        };

        // Under canonical ordering the member was activated at approval time;
        // anything else is surfaced for review, never "fixed" by touching
        // slot counts from this path.
        if !self.memberships.is_active(pending.group_id, pending.user_id) {
            log::warn!(
                "captured payment {} settles obligation {} but membership ({}, {}) is not active",
                entity.id,
                pending.id,
                pending.group_id,
                pending.user_id
            );
        }

        let paid_at = Utc::now();
        let billing_cycle = self
            .groups
            .get(pending.group_id)
            .and_then(|g| self.subscriptions.get(g.subscription_id))
            .map(|s| s.billing_cycle)
            .unwrap_or(BillingCycle::Monthly);

        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: pending.user_id,
            group_id: pending.group_id,
            group_name: pending.group_name,
            amount: from_minor_units(entity.amount),
            status: PaymentStatus::Completed,
            gateway_order_id: entity.order_id,
            gateway_payment_id: entity.id,
            paid_at,
            next_due_date: billing_cycle.next_due(paid_at),
        };
        log::info!(
            "payment {} recorded for user {} group {}",
            payment.gateway_payment_id,
            payment.user_id,
            payment.group_id
        );
        payments.push(payment);
        Ok(WebhookOutcome::Processed)
    }

    pub fn history_for(&self, user_id: Uuid) -> Vec<Payment> {
        let payments = self.payments.lock().unwrap();
        let mut history: Vec<Payment> = payments.iter().filter(|p| p.user_id == user_id).cloned().collect();
        history.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        history
    }

    pub fn pending_for(&self, user_id: Uuid) -> Vec<crate::models::payment::PendingPayment> {
        self.obligations.list_for_user(user_id)
    }

    pub fn unmatched_events(&self) -> Vec<UnmatchedEvent> {
        let unmatched = self.unmatched.lock().unwrap();
        unmatched.clone()
    }

    fn record_unmatched(&self, entity: &PaymentEntity, reason: &str) {
        log::warn!("unmatched payment {} ({}): queued for manual reconciliation", entity.id, reason);
        let mut unmatched = self.unmatched.lock().unwrap();
        // Redelivery of an already-queued event should not grow the queue.
        if unmatched.iter().any(|e| e.gateway_payment_id == entity.id) {
            return;
        }
        unmatched.push(UnmatchedEvent {
            gateway_payment_id: entity.id.clone(),
            gateway_order_id: entity.order_id.clone(),
            amount: entity.amount,
            reason: reason.to_string(),
            received_at: Utc::now(),
        });
    }
}
