use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Response of `POST /bookings/:id/payment/order` — what the frontend
/// needs to open Razorpay checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub booking_id: Uuid,
    pub order_id: String,
    /// Amount in the smallest currency unit, as the gateway quotes it.
    pub amount: u64,
    pub currency: String,
    /// Razorpay key id for checkout initialization.
    pub key_id: String,
}

/// Body of `POST /payments/verify` — the checkout callback parameters.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub booking_id: Uuid,
    #[validate(length(min = 1, message = "razorpayOrderId is required"))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1, message = "razorpayPaymentId is required"))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1, message = "razorpaySignature is required"))]
    pub razorpay_signature: String,
}

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
