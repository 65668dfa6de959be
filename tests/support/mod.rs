use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use subshare::config::{Config, RazorpayConfig};
use subshare::models::user::AuthUser;
use subshare::services::AppServices;

pub const WEBHOOK_SECRET: &str = "test_webhook_secret";

/// Service graph wired with test configuration, shared with the app under
/// test via `AppServices::configure`.
pub struct TestCtx {
    pub services: AppServices,
}

impl TestCtx {
    pub fn new() -> Self {
        let config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            token_secret: "test-token-secret".to_string(),
            razorpay: RazorpayConfig {
                api_base: "https://api.razorpay.com".to_string(),
                key_id: "rzp_test_key".to_string(),
                key_secret: "rzp_test_secret".to_string(),
                webhook_secret: WEBHOOK_SECRET.to_string(),
                currency: "INR".to_string(),
            },
        };
        Self {
            services: AppServices::build(&config),
        }
    }

    /// A fresh user plus a bearer token the identity service accepts.
    pub fn login(&self, name: &str, email: &str) -> (AuthUser, String) {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        let token = self.services.identity.issue(&user);
        (user, token)
    }

    /// Signs a webhook body the way the gateway does.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
