//! Booking pricing policy.
//!
//! Pure and deterministic: the charge for a booking is computed exactly
//! once at creation and never revisited. Trial sessions always carry at
//! least the configured floor so a misconfigured tutor profile cannot
//! produce a free (or negative) trial.

use crate::config::PricingConfig;
use crate::models::{Course, Tutor};

/// Compute the charge for a booking request.
///
/// Regular bookings resolve in precedence order: course price, then the
/// tutor's hourly fee, then the platform default.
pub fn compute_amount(
    pricing: &PricingConfig,
    is_trial: bool,
    tutor: &Tutor,
    course: Option<&Course>,
) -> f64 {
    let amount = if is_trial {
        match tutor.trial_fee {
            Some(fee) if fee >= pricing.trial_fee_floor => fee,
            _ => pricing.trial_fee_floor,
        }
    } else {
        course
            .and_then(|c| c.price)
            .or(tutor.fee_per_hour)
            .unwrap_or(pricing.default_session_fee)
    };

    amount.max(0.0)
}
