//! Booking request and contact form intake.

mod support;

use axum::http::{Method, StatusCode};
use bedfinder_core::{BookingStatus, Hospital};
use support::{
    assert_error_code, assert_status, booking_request, contact_message,
    hospital_without_icu_beds, parse_json, TestApp,
};

#[tokio::test]
async fn booking_is_recorded_as_pending() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .post_json("/api/hospitals/2/bookings", booking_request("ICU"))
        .await?;
    assert_status(status, StatusCode::CREATED, "create booking");
    assert_eq!(body["id"], 1);
    assert_eq!(body["hospital_id"], 2);
    assert_eq!(body["status"], "pending");
    assert!(body["message"].as_str().unwrap().contains("booking ID is: 1"));

    let stored = app.state.bookings.get_by_id(1).await?.unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
    assert_eq!(stored.patient_name, "Jane Roe");
    assert_eq!(stored.special_requirements.as_deref(), Some("Wheelchair access"));
    Ok(())
}

#[tokio::test]
async fn booking_ids_increase_per_request() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    for expected in 1..=3 {
        let (status, body) = app
            .post_json("/api/hospitals/1/bookings", booking_request("General"))
            .await?;
        assert_status(status, StatusCode::CREATED, "create booking");
        assert_eq!(body["id"], expected);
    }
    assert_eq!(app.state.bookings.get_by_hospital(1).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn booking_does_not_change_bed_counts() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let before = app.state.hospitals.get_by_id(1).await?.unwrap();

    app.post_json("/api/hospitals/1/bookings", booking_request("ICU"))
        .await?;

    let after = app.state.hospitals.get_by_id(1).await?.unwrap();
    assert_eq!(before.available_beds, after.available_beds);
    Ok(())
}

#[tokio::test]
async fn booking_unknown_hospital_is_404() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .post_json("/api/hospitals/42/bookings", booking_request("ICU"))
        .await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown hospital");
    assert_error_code(&body, "not-found");
    assert!(app.state.bookings.get_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn booking_requires_a_bookable_bed_type() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    // Greenwood does not list ICU beds.
    let (status, body) = app
        .post_json("/api/hospitals/5/bookings", booking_request("ICU"))
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "unlisted bed type");
    assert_error_code(&body, "invalid");

    let riverside: Hospital = serde_json::from_value(hospital_without_icu_beds())?;
    let id = app.state.hospitals.create(&riverside).await?;
    let (status, _) = app
        .post_json(&format!("/api/hospitals/{id}/bookings"), booking_request("ICU"))
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "no free beds");

    assert!(app.state.bookings.get_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_booking_fields_are_reported() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let mut request = booking_request("ICU");
    request["patient_name"] = "J".into();
    request["patient_age"] = 200.into();
    request["patient_email"] = "nope".into();

    let (status, body) = app.post_json("/api/hospitals/1/bookings", request).await?;
    assert_status(status, StatusCode::BAD_REQUEST, "invalid booking");
    let fields = &body["error"]["fields"];
    assert!(fields.get("patient_name").is_some());
    assert!(fields.get("patient_age").is_some());
    assert!(fields.get("patient_email").is_some());
    assert!(fields.get("patient_phone").is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_booking_json_is_400() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, _) = app
        .post_json(
            "/api/hospitals/1/bookings",
            serde_json::json!({"patient_name": "Jane Roe"}),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "missing fields");
    Ok(())
}

#[tokio::test]
async fn contact_message_is_accepted() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, _, body) = app
        .request(Method::POST, "/api/contact", Some(contact_message()))
        .await?;
    assert_status(status, StatusCode::ACCEPTED, "contact");
    assert!(parse_json(&body)?["message"]
        .as_str()
        .unwrap()
        .starts_with("Thank you"));
    Ok(())
}

#[tokio::test]
async fn short_contact_message_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let mut message = contact_message();
    message["message"] = "Hi".into();
    message["subject"] = "?".into();

    let (status, body) = app.post_json("/api/contact", message).await?;
    assert_status(status, StatusCode::BAD_REQUEST, "short contact");
    assert!(body["error"]["fields"].get("message").is_some());
    assert!(body["error"]["fields"].get("subject").is_some());
    Ok(())
}
