//! Booking lifecycle handlers: creation, retrieval, listings and
//! tutor-initiated status transitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::DateTime;
use uuid::Uuid;

use crate::{
    dtos::{
        ApiResponse, BookingQuery, BookingResponse, CreateBookingRequest, Pagination,
        UpdateStatusRequest,
    },
    middleware::AuthUser,
    models::{Booking, BookingStatus, PaymentStatus},
    services::{error::AppError, metrics, pricing, BookingAccess},
    utils::ValidatedJson,
    AppState,
};

/// Create a booking: resolve the tutor (and course, if referenced),
/// price it once, persist it pending, and notify both parties.
pub async fn create_booking(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>), AppError> {
    let tutor = state
        .catalog
        .find_tutor(payload.tutor_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tutor not found")))?;

    let course = match payload.course_id {
        Some(course_id) => Some(
            state
                .catalog
                .find_course(course_id)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Course not found")))?,
        ),
        None => None,
    };

    let amount = pricing::compute_amount(
        &state.config.pricing,
        payload.is_trial,
        &tutor,
        course.as_ref(),
    );

    let now = DateTime::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        student: caller.id,
        tutor: tutor.id,
        course: course.as_ref().map(|c| c.id),
        session_date: payload.session_date,
        session_time: payload.session_time,
        is_trial: payload.is_trial,
        message: payload.message,
        amount,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        can_chat: false,
        private_details_unlocked: false,
        rejection_reason: None,
        provider_order_id: None,
        version: 0,
        created_at: now,
        updated_at: now,
    };

    tracing::info!(
        booking_id = %booking.id,
        student = %caller.id,
        tutor = %tutor.id,
        is_trial = booking.is_trial,
        amount,
        "Creating booking"
    );

    state.repository.create(booking.clone()).await?;

    metrics::record_booking_created(booking.is_trial);

    // Best-effort: mail failures must never fail the booking.
    state
        .notifier
        .notify_booking_created(&booking, &tutor, &caller.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(BookingResponse::joined(
            booking,
            Some(&tutor),
            course.as_ref(),
        ))),
    ))
}

/// Fetch one booking. Only the booking's student or tutor may see it.
pub async fn get_booking(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let booking = state
        .repository
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;

    let access = evaluate_access(&state, &caller, &booking).await?;
    access.require_party()?;

    let tutor = state.catalog.find_tutor(booking.tutor).await?;
    let course = match booking.course {
        Some(course_id) => state.catalog.find_course(course_id).await?,
        None => None,
    };

    Ok(Json(ApiResponse::data(BookingResponse::joined(
        booking,
        tutor.as_ref(),
        course.as_ref(),
    ))))
}

/// `GET /bookings/my-bookings` — the caller's bookings as a student.
pub async fn list_my_bookings(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<BookingQuery>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, AppError> {
    let status_filter = parse_status_filter(query.status.as_deref())?;
    let (page, limit) = (query.page(), query.limit());

    let (bookings, total) = state
        .repository
        .list_for_student(
            caller.id,
            status_filter,
            limit as i64,
            Pagination::skip(page, limit),
        )
        .await?;

    let data = join_bookings(&state, bookings).await?;

    Ok(Json(ApiResponse::paginated(
        data,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /bookings/tutor-bookings` — bookings against the caller's tutor
/// profile.
pub async fn list_tutor_bookings(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<BookingQuery>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, AppError> {
    let tutor = state
        .catalog
        .find_tutor_by_user(caller.id)
        .await?
        .ok_or_else(|| {
            AppError::PermissionDenied(anyhow::anyhow!("Caller has no tutor profile"))
        })?;

    let status_filter = parse_status_filter(query.status.as_deref())?;
    let (page, limit) = (query.page(), query.limit());

    let (bookings, total) = state
        .repository
        .list_for_tutor(
            tutor.id,
            status_filter,
            limit as i64,
            Pagination::skip(page, limit),
        )
        .await?;

    let data = join_bookings(&state, bookings).await?;

    Ok(Json(ApiResponse::paginated(
        data,
        Pagination::new(page, limit, total),
    )))
}

/// `PATCH /bookings/:id/status` — tutor-initiated state transition.
pub async fn update_status(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(booking_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let booking = state
        .repository
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;

    let access = evaluate_access(&state, &caller, &booking).await?;
    access.require_tutor()?;

    let target = BookingStatus::parse(&payload.status)
        .filter(BookingStatus::is_legal_target)
        .ok_or_else(|| AppError::InvalidStatus(payload.status.clone()))?;

    // A reason travels with a rejection and nothing else.
    let rejection_reason = if target == BookingStatus::Rejected {
        payload.rejection_reason
    } else {
        None
    };

    tracing::info!(
        booking_id = %booking_id,
        tutor = %booking.tutor,
        from = booking.status.as_str(),
        to = target.as_str(),
        "Updating booking status"
    );

    let updated = state
        .repository
        .update_status(booking_id, booking.version, target, rejection_reason)
        .await?
        .ok_or_else(|| {
            tracing::warn!(booking_id = %booking_id, "Lost a concurrent status update");
            AppError::NotFound(anyhow::anyhow!(
                "Booking was modified concurrently, please retry"
            ))
        })?;

    metrics::record_status_transition(target.as_str());

    let tutor = state.catalog.find_tutor(updated.tutor).await?;
    let course = match updated.course {
        Some(course_id) => state.catalog.find_course(course_id).await?,
        None => None,
    };

    Ok(Json(ApiResponse::with_message(
        BookingResponse::joined(updated, tutor.as_ref(), course.as_ref()),
        format!("Booking {}", target.as_str()),
    )))
}

/// Resolve the caller's tutor profile (if any) and evaluate the guard.
pub(crate) async fn evaluate_access(
    state: &AppState,
    caller: &AuthUser,
    booking: &Booking,
) -> Result<BookingAccess, AppError> {
    let tutor_profile = state
        .catalog
        .find_tutor_by_user(caller.id)
        .await?
        .map(|t| t.id);

    Ok(BookingAccess::evaluate(caller.id, tutor_profile, booking))
}

fn parse_status_filter(status: Option<&str>) -> Result<Option<BookingStatus>, AppError> {
    match status {
        None | Some("") => Ok(None),
        Some(s) => BookingStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::InvalidStatus(s.to_string())),
    }
}

/// Join a page of bookings with the tutors/courses they reference.
async fn join_bookings(
    state: &AppState,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingResponse>, AppError> {
    let mut tutor_ids: Vec<Uuid> = bookings.iter().map(|b| b.tutor).collect();
    tutor_ids.sort_unstable();
    tutor_ids.dedup();

    let mut course_ids: Vec<Uuid> = bookings.iter().filter_map(|b| b.course).collect();
    course_ids.sort_unstable();
    course_ids.dedup();

    let tutors = state.catalog.find_tutors(&tutor_ids).await?;
    let courses = state.catalog.find_courses(&course_ids).await?;

    Ok(bookings
        .into_iter()
        .map(|b| {
            let tutor = tutors.iter().find(|t| t.id == b.tutor);
            let course = b
                .course
                .and_then(|id| courses.iter().find(|c| c.id == id));
            BookingResponse::joined(b, tutor, course)
        })
        .collect())
}
