pub mod authorization;
pub mod error;
pub mod metrics;
pub mod notification;
pub mod pricing;
pub mod razorpay;
pub mod repository;

pub use authorization::BookingAccess;
pub use error::AppError;
pub use metrics::{get_metrics, init_metrics};
pub use notification::Notifier;
pub use razorpay::RazorpayClient;
pub use repository::{BookingRepository, CatalogRepository};
