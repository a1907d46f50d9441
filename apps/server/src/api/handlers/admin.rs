//! Admin login and booking management

use axum::{
    extract::State,
    Extension, Json,
};
use bedfinder_core::{models::UnknownStatus, AdminProfile, Booking, BookingStatus, Hospital};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::extractors::{trim_in_place, Normalize, Path, ValidatedJson},
    auth::AuthenticatedAdmin,
    metrics::{ADMIN_LOGINS_TOTAL, BOOKING_STATUS_UPDATES_TOTAL},
    request_context::RequestContext,
    state::AppState,
    Error, Result,
};

const LOGIN_FAILED: &str = "Invalid username or password";

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "is required"))]
    pub password: String,
}

impl Normalize for LoginRequest {
    fn normalize(mut self) -> Self {
        trim_in_place(&mut self.username);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub admin: AdminProfile,
}

/// `POST /admin/login`
pub async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    ValidatedJson(credentials): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let Some(admin) = state
        .admins
        .authenticate(&credentials.username, &credentials.password)
        .await?
    else {
        ADMIN_LOGINS_TOTAL.with_label_values(&["failure"]).inc();
        tracing::warn!(
            request_id = %context.request_id,
            username = %credentials.username,
            "Admin login failed"
        );
        return Err(Error::Unauthorized(LOGIN_FAILED.to_string()));
    };

    let issued = state.tokens.issue(&admin)?;
    ADMIN_LOGINS_TOTAL.with_label_values(&["success"]).inc();
    tracing::info!(
        request_id = %context.request_id,
        admin_id = admin.id,
        "Admin logged in"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
        admin: AdminProfile::from(&admin),
    }))
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_hospitals: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub confirmed_bookings: usize,
    pub cancelled_bookings: usize,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub admin: String,
    pub stats: DashboardStats,
    pub hospitals: Vec<Hospital>,
    /// Newest first.
    pub bookings: Vec<Booking>,
}

fn count(bookings: &[Booking], status: BookingStatus) -> usize {
    bookings.iter().filter(|b| b.status == status).count()
}

/// `GET /admin/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedAdmin(principal): AuthenticatedAdmin,
) -> Result<Json<Dashboard>> {
    let hospitals = state.hospitals.get_all().await?;
    let mut bookings = state.bookings.get_all().await?;
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let stats = DashboardStats {
        total_hospitals: hospitals.len(),
        total_bookings: bookings.len(),
        pending_bookings: count(&bookings, BookingStatus::Pending),
        confirmed_bookings: count(&bookings, BookingStatus::Confirmed),
        cancelled_bookings: count(&bookings, BookingStatus::Cancelled),
    };

    Ok(Json(Dashboard {
        admin: principal.username,
        stats,
        hospitals,
        bookings,
    }))
}

/// `GET /admin/hospitals/:id/bookings`
pub async fn hospital_bookings(
    State(state): State<AppState>,
    Path(hospital_id): Path<i64>,
) -> Result<Json<Vec<Booking>>> {
    if state.hospitals.get_by_id(hospital_id).await?.is_none() {
        return Err(Error::NotFound(format!("Hospital {hospital_id}")));
    }
    Ok(Json(state.bookings.get_by_hospital(hospital_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusUpdate {
    #[validate(length(min = 1, max = 32, message = "is required"))]
    pub status: String,
}

impl Normalize for StatusUpdate {
    fn normalize(mut self) -> Self {
        trim_in_place(&mut self.status);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
    pub id: i64,
    pub status: BookingStatus,
    pub message: String,
}

/// `POST /admin/bookings/:id/status`
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    AuthenticatedAdmin(principal): AuthenticatedAdmin,
    ValidatedJson(update): ValidatedJson<StatusUpdate>,
) -> Result<Json<StatusUpdated>> {
    let status: BookingStatus = update
        .status
        .parse()
        .map_err(|e: UnknownStatus| Error::Validation(e.to_string()))?;

    if !state.bookings.update_status(booking_id, status).await? {
        return Err(Error::NotFound(format!("Booking {booking_id}")));
    }

    BOOKING_STATUS_UPDATES_TOTAL
        .with_label_values(&[status.as_str()])
        .inc();
    tracing::info!(
        admin_id = principal.admin_id,
        booking_id,
        status = %status,
        "Booking status changed by admin"
    );

    Ok(Json(StatusUpdated {
        id: booking_id,
        status,
        message: format!("Booking {booking_id} status updated to {status}"),
    }))
}
