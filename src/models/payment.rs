use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PendingPaymentStatus {
    Approved,
    Overdue,
}

/// A standing obligation for an active member to pay their share for the
/// current billing cycle. Created exactly once, when the membership activates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub status: PendingPaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// A settled payment, created only by the reconciler from a verified gateway
/// event. `gateway_payment_id` is unique across all payments; it is the
/// idempotency key for webhook redelivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub paid_at: DateTime<Utc>,
    pub next_due_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub pending_payment_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub group_name: String,
    pub user_name: String,
    pub user_email: String,
}

/// Razorpay webhook envelope: `{event, payload: {payment: {entity: {...}}}}`.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub payment: WebhookPaymentWrapper,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPaymentWrapper {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: String,
    /// Minor units (paise).
    pub amount: i64,
    #[serde(default)]
    pub notes: Option<serde_json::Value>,
}

/// Order notes round-tripped through the gateway; they tie a captured payment
/// back to the obligation it settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNotes {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub pending_payment_id: Uuid,
}

impl OrderNotes {
    /// Gateway notes are free-form JSON; anything that does not parse is
    /// treated the same as absent notes.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// An event the reconciler could not match to an obligation, kept for manual
/// review instead of being bounced back at the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedEvent {
    pub gateway_payment_id: String,
    pub gateway_order_id: String,
    pub amount: i64,
    pub reason: String,
    pub received_at: DateTime<Utc>,
}

/// Converts a decimal rupee amount to gateway minor units (paise).
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).round().to_i64()
}

/// Converts gateway minor units back to a decimal amount.
pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_unit_round_trip() {
        let amount = Decimal::new(199_00, 2); // 199.00
        assert_eq!(to_minor_units(amount), Some(19900));
        assert_eq!(from_minor_units(19900), amount);
    }

    #[test]
    fn notes_parse_from_gateway_value() {
        let notes = OrderNotes {
            user_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            pending_payment_id: Uuid::new_v4(),
        };
        let value = serde_json::to_value(&notes).unwrap();
        let parsed = OrderNotes::from_value(&value).unwrap();
        assert_eq!(parsed.pending_payment_id, notes.pending_payment_id);
    }

    #[test]
    fn malformed_notes_are_none() {
        let value = serde_json::json!({"user_id": "not-a-uuid"});
        assert!(OrderNotes::from_value(&value).is_none());
    }

    #[test]
    fn webhook_envelope_parses() {
        let body = serde_json::json!({
            "event": "payment.captured",
            "payload": {"payment": {"entity": {
                "id": "pay_test456",
                "order_id": "order_test123",
                "amount": 19900,
            }}}
        });
        let envelope: WebhookEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.event, "payment.captured");
        assert_eq!(envelope.payload.payment.entity.amount, 19900);
        assert!(envelope.payload.payment.entity.notes.is_none());
    }
}
