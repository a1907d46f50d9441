//! Public directory routes under `/api`

use crate::api::handlers::{blog, bookings, contact, hospitals};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/hospitals", get(hospitals::search_hospitals))
        .route("/hospitals/facets", get(hospitals::hospital_facets))
        .route("/hospitals/:id", get(hospitals::get_hospital))
        .route("/hospitals/:id/bookings", post(bookings::create_booking))
        .route("/cities/:city", get(hospitals::city_hospitals))
        .route("/contact", post(contact::submit_contact))
        .route("/blog", get(blog::list_posts))
        .route("/blog/:slug", get(blog::get_post))
}
