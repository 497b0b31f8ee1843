//! Payment handlers: checkout order creation, checkout verification and
//! the gateway webhook.
//!
//! Verification is the `ApplyPaymentOutcome` boundary: a valid signature
//! moves the booking to paid and unlocks chat and contact details in one
//! atomic update; an invalid one durably records the failed attempt
//! before the error is returned.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::{
    dtos::{ApiResponse, BookingResponse, CreateOrderResponse, VerifyPaymentRequest, WebhookAck},
    handlers::bookings::evaluate_access,
    middleware::AuthUser,
    models::{Booking, PaymentStatus},
    services::{error::AppError, metrics, razorpay::PaymentVerification},
    utils::ValidatedJson,
    AppState,
};

/// `POST /bookings/:id/payment/order` — open a gateway checkout order
/// for the booking amount. Student only.
pub async fn create_payment_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<CreateOrderResponse>>), AppError> {
    let booking = state
        .repository
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;

    let access = evaluate_access(&state, &caller, &booking).await?;
    access.require_student()?;

    if booking.payment_status == PaymentStatus::Success {
        return Err(AppError::Validation(
            "Booking is already paid".to_string(),
        ));
    }

    if !state.razorpay.is_configured() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Payment gateway is not configured for this environment"
        )));
    }

    let order = state
        .razorpay
        .create_order(booking.amount, booking.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, booking_id = %booking.id, "Failed to create payment order");
            AppError::Internal(anyhow::anyhow!("Failed to create payment order"))
        })?;

    state
        .repository
        .set_provider_order(booking.id, booking.version, &order.id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!(
                "Booking was modified concurrently, please retry"
            ))
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(CreateOrderResponse {
            booking_id: booking.id,
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: state.razorpay.key_id().to_string(),
        })),
    ))
}

/// `POST /payments/verify` — checkout callback verification.
pub async fn verify_payment(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let booking = state
        .repository
        .find_by_id(payload.booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;

    let access = evaluate_access(&state, &caller, &booking).await?;
    access.require_party()?;

    if booking.provider_order_id.as_deref() != Some(payload.razorpay_order_id.as_str()) {
        tracing::warn!(
            booking_id = %booking.id,
            expected = ?booking.provider_order_id,
            received = %payload.razorpay_order_id,
            "Order ID mismatch on payment verification"
        );
        return Err(AppError::Validation(
            "Order ID does not match booking".to_string(),
        ));
    }

    let verification = PaymentVerification {
        razorpay_order_id: payload.razorpay_order_id.clone(),
        razorpay_payment_id: payload.razorpay_payment_id.clone(),
        razorpay_signature: payload.razorpay_signature.clone(),
    };

    let is_valid = state
        .razorpay
        .verify_payment_signature(&verification)
        .map_err(|e| {
            tracing::error!(error = %e, "Signature verification error");
            AppError::Internal(anyhow::anyhow!("Signature verification failed"))
        })?;

    if !is_valid {
        // A failed verification attempt is recorded durably before the
        // error surfaces.
        state
            .repository
            .mark_payment_outcome(booking.id, PaymentStatus::Failed)
            .await?;
        metrics::record_payment_outcome("failed");
        return Err(AppError::SignatureMismatch);
    }

    let updated = apply_success(&state, booking.id).await?;
    metrics::record_payment_outcome("success");

    let tutor = state.catalog.find_tutor(updated.tutor).await?;
    let course = match updated.course {
        Some(course_id) => state.catalog.find_course(course_id).await?,
        None => None,
    };

    Ok(Json(ApiResponse::with_message(
        BookingResponse::joined(updated, tutor.as_ref(), course.as_ref()),
        "Payment verified successfully",
    )))
}

/// `POST /webhooks/razorpay` — gateway-originated outcomes. Signed with
/// the webhook secret over the raw body; unauthenticated otherwise.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<WebhookAck>), AppError> {
    let signature = headers
        .get("X-Razorpay-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing X-Razorpay-Signature header");
            AppError::Unauthenticated(anyhow::anyhow!("Missing webhook signature"))
        })?;

    let is_valid = state
        .razorpay
        .verify_webhook_signature(&body, signature)
        .map_err(|e| {
            tracing::error!(error = %e, "Webhook signature verification error");
            AppError::Internal(anyhow::anyhow!("Webhook verification failed"))
        })?;

    if !is_valid {
        return Err(AppError::SignatureMismatch);
    }

    let event = state.razorpay.parse_webhook_event(&body).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse webhook event");
        AppError::Validation("Invalid webhook payload".to_string())
    })?;

    tracing::info!(event_type = %event.event, "Processing Razorpay webhook");

    let payment = event.payload.payment.map(|p| p.entity);
    let order_id = payment.as_ref().and_then(|p| p.order_id.clone());

    match (event.event.as_str(), order_id) {
        ("payment.captured", Some(order_id)) => {
            if let Some(booking) = state.repository.find_by_provider_order(&order_id).await? {
                apply_success(&state, booking.id).await?;
                metrics::record_payment_outcome("success");
            } else {
                tracing::warn!(order_id = %order_id, "Webhook for unknown order");
            }
        }
        ("payment.failed", Some(order_id)) => {
            if let Some(booking) = state.repository.find_by_provider_order(&order_id).await? {
                state
                    .repository
                    .mark_payment_outcome(booking.id, PaymentStatus::Failed)
                    .await?;
                metrics::record_payment_outcome("failed");
            }
        }
        ("refund.processed", Some(order_id)) => {
            if let Some(booking) = state.repository.find_by_provider_order(&order_id).await? {
                // Chat/contact stay unlocked; only the payment status moves.
                state
                    .repository
                    .mark_payment_outcome(booking.id, PaymentStatus::Refunded)
                    .await?;
                metrics::record_payment_outcome("refunded");
            }
        }
        (event_type, _) => {
            tracing::debug!(event_type = %event_type, "Unhandled webhook event type");
        }
    }

    // Acknowledge receipt so the gateway stops retrying.
    Ok((StatusCode::OK, Json(WebhookAck { received: true })))
}

async fn apply_success(state: &AppState, booking_id: Uuid) -> Result<Booking, AppError> {
    state
        .repository
        .mark_payment_success(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))
}
