//! Booking document and its status state machine.

use chrono::NaiveDate;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student's request to meet a tutor at a given slot, with the charge
/// fixed at creation time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Account id of the requesting student. Immutable.
    pub student: Uuid,
    /// Tutor profile id being booked. Immutable.
    pub tutor: Uuid,
    /// Course the booking is for, if any. Immutable.
    pub course: Option<Uuid>,
    pub session_date: NaiveDate,
    pub session_time: String,
    pub is_trial: bool,
    pub message: Option<String>,
    /// Charge computed once by the pricing policy. Never recomputed.
    pub amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub can_chat: bool,
    pub private_details_unlocked: bool,
    pub rejection_reason: Option<String>,
    /// Gateway order id once a checkout order has been opened.
    pub provider_order_id: Option<String>,
    /// Optimistic concurrency token, incremented on every update.
    pub version: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Booking {
    /// Whether payment success has unlocked chat and contact details.
    /// Both flags flip together and are never reset.
    pub fn is_unlocked(&self) -> bool {
        self.can_chat && self.private_details_unlocked
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a requested status value. Unknown values yield `None` and
    /// are reported as an invalid status by the caller.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "accepted" => Some(BookingStatus::Accepted),
            "rejected" => Some(BookingStatus::Rejected),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Targets a tutor may move a booking to. `pending` is the initial
    /// state only and can never be re-entered.
    pub fn is_legal_target(&self) -> bool {
        matches!(
            self,
            BookingStatus::Accepted
                | BookingStatus::Rejected
                | BookingStatus::Completed
                | BookingStatus::Cancelled
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}
