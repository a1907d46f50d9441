//! Admin routes under `/admin`
//!
//! Everything except `/login` requires a bearer token.

use crate::api::handlers::admin;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn admin_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/hospitals/:id/bookings", get(admin::hospital_bookings))
        .route("/bookings/:id/status", post(admin::update_booking_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            crate::auth::admin_middleware,
        ));

    Router::new()
        .route("/login", post(admin::login))
        .merge(protected)
}
