mod common;

use common::TestApp;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn create_booking_prices_and_initializes_pending_state() {
    let app = TestApp::spawn().await;

    let student = Uuid::new_v4();
    let tutor = app.seed_tutor(Uuid::new_v4(), Some(500.0), None).await;

    let response = app
        .client
        .post(format!("{}/bookings", app.address))
        .bearer_auth(app.token_for(student, "student@example.com"))
        .json(&json!({
            "tutorId": tutor.id,
            "sessionDate": "2026-09-01",
            "sessionTime": "17:00"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let booking = &body["data"];
    assert_eq!(booking["amount"], 500.0);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["paymentStatus"], "pending");
    assert_eq!(booking["canChat"], false);
    assert_eq!(booking["privateDetailsUnlocked"], false);
    // Contact details stay hidden until payment succeeds.
    assert!(booking["tutor"]["email"].is_null());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn trial_booking_without_configured_trial_fee_uses_the_floor() {
    let app = TestApp::spawn().await;

    let student = Uuid::new_v4();
    let tutor = app.seed_tutor(Uuid::new_v4(), Some(800.0), None).await;

    let response = app
        .client
        .post(format!("{}/bookings", app.address))
        .bearer_auth(app.token_for(student, "student@example.com"))
        .json(&json!({
            "tutorId": tutor.id,
            "sessionDate": "2026-09-01",
            "sessionTime": "10:00",
            "isTrial": true
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["amount"], 49.0);
    assert_eq!(body["data"]["isTrial"], true);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn course_booking_charges_the_course_price() {
    let app = TestApp::spawn().await;

    let student = Uuid::new_v4();
    let tutor = app.seed_tutor(Uuid::new_v4(), Some(500.0), None).await;
    let course = app.seed_course(tutor.id, Some(2000.0)).await;

    let response = app
        .client
        .post(format!("{}/bookings", app.address))
        .bearer_auth(app.token_for(student, "student@example.com"))
        .json(&json!({
            "tutorId": tutor.id,
            "courseId": course.id,
            "sessionDate": "2026-09-02",
            "sessionTime": "11:00"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["amount"], 2000.0);
    assert_eq!(body["data"]["course"]["title"], course.title);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn booking_an_unknown_tutor_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/bookings", app.address))
        .bearer_auth(app.token_for(Uuid::new_v4(), "student@example.com"))
        .json(&json!({
            "tutorId": Uuid::new_v4(),
            "sessionDate": "2026-09-01",
            "sessionTime": "17:00"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn blank_session_time_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let tutor = app.seed_tutor(Uuid::new_v4(), Some(500.0), None).await;
    let response = app
        .client
        .post(format!("{}/bookings", app.address))
        .bearer_auth(app.token_for(Uuid::new_v4(), "student@example.com"))
        .json(&json!({
            "tutorId": tutor.id,
            "sessionDate": "2026-09-01",
            "sessionTime": ""
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn requests_without_a_token_are_unauthenticated() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/bookings/my-bookings", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 401);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn third_party_cannot_read_a_booking() {
    let app = TestApp::spawn().await;

    let student = Uuid::new_v4();
    let tutor = app.seed_tutor(Uuid::new_v4(), Some(500.0), None).await;

    let created: Value = app
        .client
        .post(format!("{}/bookings", app.address))
        .bearer_auth(app.token_for(student, "student@example.com"))
        .json(&json!({
            "tutorId": tutor.id,
            "sessionDate": "2026-09-01",
            "sessionTime": "17:00"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let booking_id = created["data"]["id"].as_str().unwrap().to_string();

    // The student and the booked tutor can read it.
    let response = app
        .client
        .get(format!("{}/bookings/{}", app.address, booking_id))
        .bearer_auth(app.token_for(student, "student@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // A stranger cannot.
    let response = app
        .client
        .get(format!("{}/bookings/{}", app.address, booking_id))
        .bearer_auth(app.token_for(Uuid::new_v4(), "stranger@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn my_bookings_paginates_newest_first() {
    let app = TestApp::spawn().await;

    let student = Uuid::new_v4();
    let tutor = app.seed_tutor(Uuid::new_v4(), Some(500.0), None).await;
    let token = app.token_for(student, "student@example.com");

    for day in 1..=3 {
        let response = app
            .client
            .post(format!("{}/bookings", app.address))
            .bearer_auth(&token)
            .json(&json!({
                "tutorId": tutor.id,
                "sessionDate": format!("2026-09-{:02}", day),
                "sessionTime": "17:00"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let body: Value = app
        .client
        .get(format!(
            "{}/bookings/my-bookings?page=1&limit=2",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["pagination"]["page"], 1);

    let body: Value = app
        .client
        .get(format!(
            "{}/bookings/my-bookings?page=2&limit=2",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn unknown_status_filter_is_invalid() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!(
            "{}/bookings/my-bookings?status=confirmed",
            app.address
        ))
        .bearer_auth(app.token_for(Uuid::new_v4(), "student@example.com"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn tutor_bookings_requires_a_tutor_profile() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/bookings/tutor-bookings", app.address))
        .bearer_auth(app.token_for(Uuid::new_v4(), "student@example.com"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);

    app.cleanup().await;
}
