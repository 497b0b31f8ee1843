use anyhow::Result;
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Course, PaymentStatus, Tutor};

/// Persistence for bookings. Single-document updates are the only
/// atomicity guarantee used; every update filters on the version the
/// caller read and increments it, so a lost race matches zero documents
/// instead of interleaving.
#[derive(Clone)]
pub struct BookingRepository {
    bookings: Collection<Booking>,
}

impl BookingRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            bookings: db.collection("bookings"),
        }
    }

    /// Initialize indexes for the listing and webhook lookup paths.
    pub async fn init_indexes(&self) -> Result<()> {
        let student_idx = IndexModel::builder()
            .keys(doc! { "student": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("student_bookings_idx".to_string())
                    .build(),
            )
            .build();

        let tutor_idx = IndexModel::builder()
            .keys(doc! { "tutor": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("tutor_bookings_idx".to_string())
                    .build(),
            )
            .build();

        let order_idx = IndexModel::builder()
            .keys(doc! { "provider_order_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("provider_order_idx".to_string())
                    .sparse(true)
                    .build(),
            )
            .build();

        self.bookings
            .create_indexes([student_idx, tutor_idx, order_idx], None)
            .await?;

        tracing::info!("Booking indexes initialized");
        Ok(())
    }

    pub async fn create(&self, booking: Booking) -> Result<()> {
        self.bookings.insert_one(booking, None).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let filter = doc! { "_id": id.to_string() };
        let booking = self.bookings.find_one(filter, None).await?;
        Ok(booking)
    }

    pub async fn find_by_provider_order(&self, order_id: &str) -> Result<Option<Booking>> {
        let filter = doc! { "provider_order_id": order_id };
        let booking = self.bookings.find_one(filter, None).await?;
        Ok(booking)
    }

    /// Apply a tutor-initiated status transition. Returns the updated
    /// document, or `None` if the booking was changed since `version`
    /// was read.
    pub async fn update_status(
        &self,
        id: Uuid,
        version: i64,
        status: BookingStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<Booking>> {
        let filter = doc! { "_id": id.to_string(), "version": version };

        let mut set = doc! {
            "status": mongodb::bson::to_bson(&status)?,
            "updated_at": mongodb::bson::DateTime::now(),
        };
        if let Some(reason) = rejection_reason {
            set.insert("rejection_reason", reason);
        }

        let update = doc! { "$set": set, "$inc": { "version": 1 } };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .bookings
            .find_one_and_update(filter, update, options)
            .await?;
        Ok(updated)
    }

    /// Record the gateway checkout order opened for a booking.
    pub async fn set_provider_order(
        &self,
        id: Uuid,
        version: i64,
        order_id: &str,
    ) -> Result<Option<Booking>> {
        let filter = doc! { "_id": id.to_string(), "version": version };
        let update = doc! {
            "$set": {
                "provider_order_id": order_id,
                "updated_at": mongodb::bson::DateTime::now(),
            },
            "$inc": { "version": 1 },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .bookings
            .find_one_and_update(filter, update, options)
            .await?;
        Ok(updated)
    }

    /// Apply a successful payment outcome: payment status, booking status
    /// and both unlock flags move in one atomic update. Idempotent for
    /// webhook re-delivery.
    pub async fn mark_payment_success(&self, id: Uuid) -> Result<Option<Booking>> {
        let filter = doc! { "_id": id.to_string() };
        let update = doc! {
            "$set": {
                "payment_status": mongodb::bson::to_bson(&PaymentStatus::Success)?,
                "status": mongodb::bson::to_bson(&BookingStatus::Accepted)?,
                "can_chat": true,
                "private_details_unlocked": true,
                "updated_at": mongodb::bson::DateTime::now(),
            },
            "$inc": { "version": 1 },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .bookings
            .find_one_and_update(filter, update, options)
            .await?;
        Ok(updated)
    }

    /// Record a failed (or refunded) payment outcome. Touches only the
    /// payment status; the unlock flags are never reset.
    pub async fn mark_payment_outcome(
        &self,
        id: Uuid,
        outcome: PaymentStatus,
    ) -> Result<Option<Booking>> {
        let filter = doc! { "_id": id.to_string() };
        let update = doc! {
            "$set": {
                "payment_status": mongodb::bson::to_bson(&outcome)?,
                "updated_at": mongodb::bson::DateTime::now(),
            },
            "$inc": { "version": 1 },
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .bookings
            .find_one_and_update(filter, update, options)
            .await?;
        Ok(updated)
    }

    pub async fn list_for_student(
        &self,
        student: Uuid,
        status_filter: Option<BookingStatus>,
        limit: i64,
        skip: u64,
    ) -> Result<(Vec<Booking>, u64)> {
        let mut filter = doc! { "student": student.to_string() };
        if let Some(status) = status_filter {
            filter.insert("status", mongodb::bson::to_bson(&status)?);
        }
        self.list(filter, limit, skip).await
    }

    pub async fn list_for_tutor(
        &self,
        tutor: Uuid,
        status_filter: Option<BookingStatus>,
        limit: i64,
        skip: u64,
    ) -> Result<(Vec<Booking>, u64)> {
        let mut filter = doc! { "tutor": tutor.to_string() };
        if let Some(status) = status_filter {
            filter.insert("status", mongodb::bson::to_bson(&status)?);
        }
        self.list(filter, limit, skip).await
    }

    async fn list(
        &self,
        filter: mongodb::bson::Document,
        limit: i64,
        skip: u64,
    ) -> Result<(Vec<Booking>, u64)> {
        let total = self.bookings.count_documents(filter.clone(), None).await?;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let cursor = self.bookings.find(filter, Some(options)).await?;
        let bookings: Vec<Booking> = cursor.try_collect().await?;

        Ok((bookings, total))
    }
}

/// Read-only access to tutor and course records. Authored by the catalog
/// side of the platform; consulted here for pricing, joins and the
/// tutor-profile lookup the authorization guard needs.
#[derive(Clone)]
pub struct CatalogRepository {
    tutors: Collection<Tutor>,
    courses: Collection<Course>,
}

impl CatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            tutors: db.collection("tutors"),
            courses: db.collection("courses"),
        }
    }

    pub async fn find_tutor(&self, id: Uuid) -> Result<Option<Tutor>> {
        let filter = doc! { "_id": id.to_string() };
        let tutor = self.tutors.find_one(filter, None).await?;
        Ok(tutor)
    }

    /// The tutor profile owned by an account, if the caller is a tutor.
    pub async fn find_tutor_by_user(&self, user: Uuid) -> Result<Option<Tutor>> {
        let filter = doc! { "user": user.to_string() };
        let tutor = self.tutors.find_one(filter, None).await?;
        Ok(tutor)
    }

    pub async fn find_course(&self, id: Uuid) -> Result<Option<Course>> {
        let filter = doc! { "_id": id.to_string() };
        let course = self.courses.find_one(filter, None).await?;
        Ok(course)
    }

    /// Batch lookup for list joins.
    pub async fn find_tutors(&self, ids: &[Uuid]) -> Result<Vec<Tutor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let filter = doc! { "_id": { "$in": ids } };
        let cursor = self.tutors.find(filter, None).await?;
        let tutors: Vec<Tutor> = cursor.try_collect().await?;
        Ok(tutors)
    }

    pub async fn find_courses(&self, ids: &[Uuid]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        let filter = doc! { "_id": { "$in": ids } };
        let cursor = self.courses.find(filter, None).await?;
        let courses: Vec<Course> = cursor.try_collect().await?;
        Ok(courses)
    }
}
