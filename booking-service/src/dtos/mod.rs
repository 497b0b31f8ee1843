pub mod booking;
pub mod payment;

pub use booking::{
    BookingQuery, BookingResponse, CourseSummary, CreateBookingRequest, TutorSummary,
    UpdateStatusRequest,
};
pub use payment::{CreateOrderResponse, VerifyPaymentRequest, WebhookAck};

use serde::Serialize;

/// The JSON envelope every endpoint answers with. Errors use the same
/// shape with `success: false` (see `services::error`).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64)
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }

    /// Documents to skip for this page: `(page - 1) * limit`.
    pub fn skip(page: u32, limit: u32) -> u64 {
        (page.saturating_sub(1) as u64) * limit as u64
    }
}
