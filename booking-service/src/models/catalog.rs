//! Read-only views of tutor and course records.
//!
//! The catalog is authored elsewhere (tutor onboarding, KYC); the booking
//! service only reads what pricing and authorization need.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Tutor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Account id the tutor profile belongs to.
    pub user: Uuid,
    pub name: String,
    pub email: String,
    pub subjects: Vec<String>,
    pub fee_per_hour: Option<f64>,
    pub trial_fee: Option<f64>,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Tutor profile that offers the course.
    pub tutor: Uuid,
    pub title: String,
    pub price: Option<f64>,
    pub created_at: DateTime,
}
