pub mod booking;
pub mod catalog;

pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use catalog::{Course, Tutor};
