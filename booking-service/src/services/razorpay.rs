//! Razorpay gateway client.
//!
//! The booking service opens checkout orders for booking amounts and
//! verifies the signatures Razorpay returns: the checkout signature is
//! HMAC-SHA256 over `order_id|payment_id`, the webhook signature is
//! HMAC-SHA256 over the raw request body, both keyed with a shared secret.

use crate::config::RazorpayConfig;
use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    config: RazorpayConfig,
}

/// Request to create a Razorpay order.
#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    /// Amount in the smallest currency unit (paise for INR).
    amount: u64,
    currency: String,
    receipt: String,
    notes: serde_json::Value,
}

/// Response from Razorpay order creation.
#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    code: String,
    description: String,
}

/// Checkout callback parameters to verify.
#[derive(Debug)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Webhook event, reduced to the payment payload the service acts on.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<WebhookPaymentEntity>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPaymentEntity {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub amount: u64,
    pub status: String,
    pub order_id: Option<String>,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Whether credentials are set. Without them order creation fails but
    /// the rest of the service keeps working.
    pub fn is_configured(&self) -> bool {
        !self.config.key_id.is_empty() && !self.config.key_secret.expose_secret().is_empty()
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Open a checkout order for a booking. `amount` is in currency units;
    /// Razorpay wants the smallest unit.
    pub async fn create_order(&self, amount: f64, booking_id: Uuid) -> Result<RazorpayOrder> {
        if !self.is_configured() {
            return Err(anyhow!("Razorpay credentials not configured"));
        }

        let request = CreateOrderRequest {
            amount: (amount * 100.0).round() as u64,
            currency: "INR".to_string(),
            receipt: booking_id.to_string(),
            notes: serde_json::json!({ "booking_id": booking_id.to_string() }),
        };

        let url = format!("{}/orders", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, body = %body, "Razorpay create_order response");

        if status.is_success() {
            let order: RazorpayOrder = serde_json::from_str(&body)?;
            tracing::info!(
                order_id = %order.id,
                booking_id = %booking_id,
                amount = order.amount,
                "Razorpay order created"
            );
            Ok(order)
        } else {
            let error: RazorpayErrorBody =
                serde_json::from_str(&body).unwrap_or_else(|_| RazorpayErrorBody {
                    error: RazorpayErrorDetail {
                        code: "UNKNOWN".to_string(),
                        description: body.clone(),
                    },
                });
            tracing::error!(
                code = %error.error.code,
                description = %error.error.description,
                "Razorpay order creation failed"
            );
            Err(anyhow!(
                "Razorpay error: {} - {}",
                error.error.code,
                error.error.description
            ))
        }
    }

    /// Verify the signature Razorpay checkout returns after payment.
    pub fn verify_payment_signature(&self, verification: &PaymentVerification) -> Result<bool> {
        let payload = format!(
            "{}|{}",
            verification.razorpay_order_id, verification.razorpay_payment_id
        );

        let expected =
            self.compute_signature(&payload, self.config.key_secret.expose_secret())?;

        let is_valid = expected == verification.razorpay_signature;

        if is_valid {
            tracing::info!(
                order_id = %verification.razorpay_order_id,
                payment_id = %verification.razorpay_payment_id,
                "Payment signature verified"
            );
        } else {
            tracing::warn!(
                order_id = %verification.razorpay_order_id,
                payment_id = %verification.razorpay_payment_id,
                "Payment signature verification failed"
            );
        }

        Ok(is_valid)
    }

    /// Verify a webhook delivery against the raw body.
    pub fn verify_webhook_signature(&self, body: &str, signature: &str) -> Result<bool> {
        let expected =
            self.compute_signature(body, self.config.webhook_secret.expose_secret())?;

        let is_valid = expected == signature;

        if !is_valid {
            tracing::warn!("Webhook signature verification failed");
        }

        Ok(is_valid)
    }

    pub fn parse_webhook_event(&self, body: &str) -> Result<WebhookEvent> {
        let event: WebhookEvent = serde_json::from_str(body)?;
        Ok(event)
    }

    fn compute_signature(&self, payload: &str, secret: &str) -> Result<String> {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| anyhow!("Invalid key length"))?;
        mac.update(payload.as_bytes());
        let result = mac.finalize();
        Ok(hex::encode(result.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn test_config() -> RazorpayConfig {
        RazorpayConfig {
            key_id: "rzp_test_123".to_string(),
            key_secret: Secret::new("my_secret_key".to_string()),
            webhook_secret: Secret::new("webhook_secret".to_string()),
            api_base_url: "https://api.razorpay.com/v1".to_string(),
        }
    }

    #[test]
    fn is_configured_requires_credentials() {
        let client = RazorpayClient::new(test_config());
        assert!(client.is_configured());

        let empty = RazorpayConfig {
            key_id: "".to_string(),
            key_secret: Secret::new("".to_string()),
            webhook_secret: Secret::new("".to_string()),
            api_base_url: "".to_string(),
        };
        assert!(!RazorpayClient::new(empty).is_configured());
    }

    #[test]
    fn checkout_signature_round_trip() {
        let client = RazorpayClient::new(test_config());

        let expected = client
            .compute_signature("order_123|pay_456", "my_secret_key")
            .unwrap();

        let verification = PaymentVerification {
            razorpay_order_id: "order_123".to_string(),
            razorpay_payment_id: "pay_456".to_string(),
            razorpay_signature: expected,
        };

        assert!(client.verify_payment_signature(&verification).unwrap());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let client = RazorpayClient::new(test_config());

        let verification = PaymentVerification {
            razorpay_order_id: "order_123".to_string(),
            razorpay_payment_id: "pay_456".to_string(),
            razorpay_signature: "deadbeef".to_string(),
        };

        assert!(!client.verify_payment_signature(&verification).unwrap());
    }

    #[test]
    fn webhook_signature_covers_raw_body() {
        let client = RazorpayClient::new(test_config());
        let body = r#"{"event":"payment.captured","payload":{"payment":{"entity":{"id":"pay_1","amount":50000,"status":"captured","order_id":"order_9"}}}}"#;

        let signature = client.compute_signature(body, "webhook_secret").unwrap();
        assert!(client.verify_webhook_signature(body, &signature).unwrap());
        assert!(!client
            .verify_webhook_signature(&format!("{} ", body), &signature)
            .unwrap());

        let event = client.parse_webhook_event(body).unwrap();
        assert_eq!(event.event, "payment.captured");
        let payment = event.payload.payment.unwrap().entity;
        assert_eq!(payment.order_id.as_deref(), Some("order_9"));
    }
}
