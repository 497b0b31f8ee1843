use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Booking, BookingStatus, Course, PaymentStatus, Tutor};

/// Body of `POST /bookings`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub tutor_id: Uuid,
    pub course_id: Option<Uuid>,
    pub session_date: NaiveDate,
    #[validate(length(min = 1, message = "sessionTime is required"))]
    pub session_time: String,
    #[validate(length(max = 500, message = "message is too long"))]
    pub message: Option<String>,
    #[serde(default)]
    pub is_trial: bool,
}

/// Body of `PATCH /bookings/:id/status`. The status arrives as a plain
/// string so unknown targets can be rejected as `InvalidStatus` rather
/// than a deserialization error.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
    pub rejection_reason: Option<String>,
}

/// Query string of the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BookingQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

/// A booking joined with the tutor/course records it references.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub student: Uuid,
    pub tutor: Option<TutorSummary>,
    pub course: Option<CourseSummary>,
    pub session_date: NaiveDate,
    pub session_time: String,
    pub is_trial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub can_chat: bool,
    pub private_details_unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_order_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Tutor projection embedded in booking responses. Contact details are
/// disclosed only once payment has unlocked them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorSummary {
    pub id: Uuid,
    pub name: String,
    pub subjects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl BookingResponse {
    pub fn joined(booking: Booking, tutor: Option<&Tutor>, course: Option<&Course>) -> Self {
        let unlocked = booking.is_unlocked();
        Self {
            id: booking.id,
            student: booking.student,
            tutor: tutor.map(|t| TutorSummary {
                id: t.id,
                name: t.name.clone(),
                subjects: t.subjects.clone(),
                email: unlocked.then(|| t.email.clone()),
            }),
            course: course.map(|c| CourseSummary {
                id: c.id,
                title: c.title.clone(),
                price: c.price,
            }),
            session_date: booking.session_date,
            session_time: booking.session_time,
            is_trial: booking.is_trial,
            message: booking.message,
            amount: booking.amount,
            status: booking.status,
            payment_status: booking.payment_status,
            can_chat: booking.can_chat,
            private_details_unlocked: booking.private_details_unlocked,
            rejection_reason: booking.rejection_reason,
            provider_order_id: booking.provider_order_id,
            created_at: booking.created_at.to_string(),
            updated_at: booking.updated_at.to_string(),
        }
    }
}
