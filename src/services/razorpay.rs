use anyhow::{anyhow, Context};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::{json, Value};
use sha2::Sha256;

use crate::models::payment::OrderNotes;

type HmacSha256 = Hmac<Sha256>;

/// Razorpay orders API client plus webhook signature verification. Order
/// creation is a plain synchronous call from the caller's point of view: on
/// failure no partial order state is kept anywhere.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    api_base: String,
    key_id: String,
    key_secret: String,
    webhook_secret: String,
}

impl RazorpayClient {
    pub fn new(api_base: String, key_id: String, key_secret: String, webhook_secret: String) -> Self {
        Self {
            client: Client::new(),
            api_base,
            key_id,
            key_secret,
            webhook_secret,
        }
    }

    /// Creates a gateway order for `amount` minor units. The notes round-trip
    /// through the gateway and come back on the capture webhook.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: &OrderNotes,
    ) -> anyhow::Result<String> {
        let url = format!("{}/v1/orders", self.api_base);
        let payload = json!({
            "amount": amount,
            "currency": currency,
            "receipt": receipt,
            "notes": notes,
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&payload)
            .send()
            .await
            .context("order request failed")?;

        let status = response.status();
        let body_text = response.text().await.context("order response unreadable")?;
        if !status.is_success() {
            return Err(anyhow!("order API error: status {}, body: {}", status, body_text));
        }

        let body: Value = serde_json::from_str(&body_text).context("order response not JSON")?;
        body.get("id")
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| anyhow!("order response missing 'id': {}", body_text))
    }

    /// HMAC-SHA256 over the raw webhook body, hex-encoded.
    pub fn calculate_signature(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        let signature = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);
        mac.verify_slice(&signature).is_ok()
    }
}
