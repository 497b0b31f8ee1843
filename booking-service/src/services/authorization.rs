//! Per-booking access checks.
//!
//! A booking is visible to exactly two parties: the student who made it
//! and the tutor it was made against. The check is re-evaluated on every
//! request from the caller's identity and the persisted booking fields;
//! nothing is cached.

use uuid::Uuid;

use crate::models::Booking;
use crate::services::error::AppError;

/// The caller's relationship to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingAccess {
    pub is_student: bool,
    pub is_tutor: bool,
}

impl BookingAccess {
    /// Evaluate the caller against a booking.
    ///
    /// `caller_tutor_profile` is the id of the tutor profile owned by the
    /// caller's account, if any; the handler resolves it from the catalog
    /// before calling in.
    pub fn evaluate(
        caller_id: Uuid,
        caller_tutor_profile: Option<Uuid>,
        booking: &Booking,
    ) -> Self {
        BookingAccess {
            is_student: caller_id == booking.student,
            is_tutor: caller_tutor_profile == Some(booking.tutor),
        }
    }

    pub fn is_party(&self) -> bool {
        self.is_student || self.is_tutor
    }

    /// Deny callers who are neither party to the booking.
    pub fn require_party(&self) -> Result<(), AppError> {
        if self.is_party() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(anyhow::anyhow!(
                "You do not have access to this booking"
            )))
        }
    }

    /// Status transitions are tutor-initiated only.
    pub fn require_tutor(&self) -> Result<(), AppError> {
        if self.is_tutor {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(anyhow::anyhow!(
                "Only the booked tutor can update this booking"
            )))
        }
    }

    /// Checkout orders are opened by the paying student only.
    pub fn require_student(&self) -> Result<(), AppError> {
        if self.is_student {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(anyhow::anyhow!(
                "Only the booking's student can pay for it"
            )))
        }
    }
}
