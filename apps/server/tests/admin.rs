//! Admin login, token checks and booking management.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::{assert_error_code, assert_status, booking_request, TestApp};

#[tokio::test]
async fn login_returns_token_and_profile() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .post_json(
            "/admin/login",
            json!({"username": "admin", "password": "admin123"}),
        )
        .await?;
    assert_status(status, StatusCode::OK, "login");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 86400);
    assert_eq!(body["admin"]["username"], "admin");
    assert!(body["admin"].get("password_hash").is_none());
    assert!(!body["token"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn bad_credentials_share_one_message() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, wrong_password) = app
        .post_json("/admin/login", json!({"username": "admin", "password": "nope"}))
        .await?;
    assert_status(status, StatusCode::UNAUTHORIZED, "wrong password");

    let (status, unknown_user) = app
        .post_json(
            "/admin/login",
            json!({"username": "ghost", "password": "admin123"}),
        )
        .await?;
    assert_status(status, StatusCode::UNAUTHORIZED, "unknown user");

    assert_eq!(wrong_password, unknown_user);
    assert_error_code(&wrong_password, "unauthorized");
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_a_valid_token() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, headers, _) = app.request(Method::GET, "/admin/dashboard", None).await?;
    assert_status(status, StatusCode::UNAUTHORIZED, "no token");
    assert_eq!(headers["www-authenticate"], "Bearer");
    assert_eq!(headers["cache-control"], "no-store");

    let (status, body) = app
        .admin_request("not-a-jwt", Method::GET, "/admin/dashboard", None)
        .await?;
    assert_status(status, StatusCode::UNAUTHORIZED, "garbage token");
    assert_error_code(&body, "unauthorized");
    Ok(())
}

#[tokio::test]
async fn token_from_another_server_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let other = TestApp::new_with_config(|config| {
        config.auth.jwt_secret = "a-completely-different-secret-value-here".to_string();
    })
    .await?;

    let foreign = other.admin_token().await?;
    let (status, _) = app
        .admin_request(&foreign, Method::GET, "/admin/dashboard", None)
        .await?;
    assert_status(status, StatusCode::UNAUTHORIZED, "foreign token");
    Ok(())
}

#[tokio::test]
async fn dashboard_reports_stats_newest_first() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    for hospital in [1, 2] {
        app.post_json(
            &format!("/api/hospitals/{hospital}/bookings"),
            booking_request("General"),
        )
        .await?;
    }

    let token = app.admin_token().await?;
    let (status, body) = app
        .admin_request(&token, Method::GET, "/admin/dashboard", None)
        .await?;
    assert_status(status, StatusCode::OK, "dashboard");
    assert_eq!(body["admin"], "admin");
    assert_eq!(body["stats"]["total_hospitals"], 6);
    assert_eq!(body["stats"]["total_bookings"], 2);
    assert_eq!(body["stats"]["pending_bookings"], 2);
    assert_eq!(body["stats"]["confirmed_bookings"], 0);
    assert_eq!(body["bookings"][0]["id"], 2);
    assert_eq!(body["bookings"][1]["id"], 1);
    Ok(())
}

#[tokio::test]
async fn status_can_be_changed_in_any_direction() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.post_json("/api/hospitals/3/bookings", booking_request("Private"))
        .await?;
    let token = app.admin_token().await?;

    for status in ["confirmed", "cancelled", "pending", "confirmed"] {
        let (code, body) = app
            .admin_request(
                &token,
                Method::POST,
                "/admin/bookings/1/status",
                Some(json!({ "status": status })),
            )
            .await?;
        assert_status(code, StatusCode::OK, status);
        assert_eq!(body["status"], status);
    }

    let (_, body) = app
        .admin_request(&token, Method::GET, "/admin/dashboard", None)
        .await?;
    assert_eq!(body["stats"]["confirmed_bookings"], 1);
    assert_eq!(body["stats"]["pending_bookings"], 0);
    Ok(())
}

#[tokio::test]
async fn unknown_status_or_booking_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.post_json("/api/hospitals/3/bookings", booking_request("Private"))
        .await?;
    let token = app.admin_token().await?;

    let (status, body) = app
        .admin_request(
            &token,
            Method::POST,
            "/admin/bookings/1/status",
            Some(json!({"status": "archived"})),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "unknown status");
    assert_error_code(&body, "invalid");

    let (status, body) = app
        .admin_request(
            &token,
            Method::POST,
            "/admin/bookings/99/status",
            Some(json!({"status": "confirmed"})),
        )
        .await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown booking");
    assert_error_code(&body, "not-found");
    Ok(())
}

#[tokio::test]
async fn malformed_status_requests_answer_in_error_shape() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.post_json("/api/hospitals/3/bookings", booking_request("Private"))
        .await?;
    let token = app.admin_token().await?;

    let (status, body) = app
        .admin_request(
            &token,
            Method::POST,
            "/admin/bookings/1/status",
            Some(json!({"state": "confirmed"})),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "missing status field");
    assert_error_code(&body, "invalid");

    let (status, body) = app
        .admin_request(
            &token,
            Method::POST,
            "/admin/bookings/first/status",
            Some(json!({"status": "confirmed"})),
        )
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "non-numeric booking id");
    assert_error_code(&body, "invalid");

    let (status, body) = app
        .admin_request(&token, Method::GET, "/admin/hospitals/one/bookings", None)
        .await?;
    assert_status(status, StatusCode::BAD_REQUEST, "non-numeric hospital id");
    assert_error_code(&body, "invalid");
    Ok(())
}

#[tokio::test]
async fn hospital_bookings_are_scoped_to_the_hospital() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    for hospital in [1, 2, 1] {
        app.post_json(
            &format!("/api/hospitals/{hospital}/bookings"),
            booking_request("ICU"),
        )
        .await?;
    }
    let token = app.admin_token().await?;

    let (status, body) = app
        .admin_request(&token, Method::GET, "/admin/hospitals/1/bookings", None)
        .await?;
    assert_status(status, StatusCode::OK, "hospital bookings");
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let (status, _) = app
        .admin_request(&token, Method::GET, "/admin/hospitals/77/bookings", None)
        .await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown hospital");
    Ok(())
}
