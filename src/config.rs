use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub token_secret: String,
    pub razorpay: RazorpayConfig,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub api_base: String,
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
    pub currency: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        Ok(Config {
            bind_address: format!("0.0.0.0:{}", port),
            token_secret: env::var("TOKEN_SECRET")?,
            razorpay: RazorpayConfig {
                api_base: env::var("RAZORPAY_API_BASE")
                    .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
                key_id: env::var("RAZORPAY_KEY_ID")?,
                key_secret: env::var("RAZORPAY_KEY_SECRET")?,
                webhook_secret: env::var("RAZORPAY_WEBHOOK_SECRET")?,
                currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            },
        })
    }
}
