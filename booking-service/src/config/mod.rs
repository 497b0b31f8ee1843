use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub pricing: PricingConfig,
    pub razorpay: RazorpayConfig,
    pub smtp: SmtpConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthConfig {
    /// Shared HS256 secret of the auth service that issues bearer tokens.
    pub jwt_secret: Secret<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PricingConfig {
    /// Minimum charge for a trial session.
    pub trial_fee_floor: f64,
    /// Charge for a regular session when neither course nor tutor sets one.
    pub default_session_fee: f64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub webhook_secret: Secret<String>,
    pub api_base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("BOOKING_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("BOOKING_SERVICE_PORT")
            .unwrap_or_else(|_| "3005".to_string())
            .parse()?;

        let db_url = env::var("BOOKING_DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name =
            env::var("BOOKING_DATABASE_NAME").unwrap_or_else(|_| "booking_db".to_string());

        let jwt_secret =
            env::var("BOOKING_JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());

        let trial_fee_floor = env::var("BOOKING_TRIAL_FEE_FLOOR")
            .unwrap_or_else(|_| "49".to_string())
            .parse()?;
        let default_session_fee = env::var("BOOKING_DEFAULT_SESSION_FEE")
            .unwrap_or_else(|_| "500".to_string())
            .parse()?;

        let razorpay_key_id = env::var("RAZORPAY_KEY_ID").unwrap_or_default();
        let razorpay_key_secret = env::var("RAZORPAY_KEY_SECRET").unwrap_or_default();
        let razorpay_webhook_secret = env::var("RAZORPAY_WEBHOOK_SECRET").unwrap_or_default();
        let razorpay_api_base_url = env::var("RAZORPAY_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());

        let smtp_enabled = env::var("SMTP_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()?;
        let smtp_user = env::var("SMTP_USER").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let smtp_from_email =
            env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| "noreply@tutormitra.in".to_string());
        let smtp_from_name =
            env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "TutorMitra".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            auth: AuthConfig {
                jwt_secret: Secret::new(jwt_secret),
            },
            pricing: PricingConfig {
                trial_fee_floor,
                default_session_fee,
            },
            razorpay: RazorpayConfig {
                key_id: razorpay_key_id,
                key_secret: Secret::new(razorpay_key_secret),
                webhook_secret: Secret::new(razorpay_webhook_secret),
                api_base_url: razorpay_api_base_url,
            },
            smtp: SmtpConfig {
                enabled: smtp_enabled,
                host: smtp_host,
                port: smtp_port,
                user: smtp_user,
                password: smtp_password,
                from_email: smtp_from_email,
                from_name: smtp_from_name,
            },
            service_name: "booking-service".to_string(),
        })
    }
}
