//! Prometheus metrics for the bed search server
//!
//! HTTP traffic is recorded by the metrics middleware; domain counters are
//! bumped from the handlers. Store gauges are refreshed on each scrape.

use axum::extract::{MatchedPath, Request};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bedfinder_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "bedfinder_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "bedfinder_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    /// HTTP response size in bytes
    pub static ref HTTP_RESPONSE_SIZE_BYTES: HistogramVec = register_histogram_vec!(
        "bedfinder_http_response_size_bytes",
        "HTTP response size in bytes",
        &["method", "path", "status"],
        vec![100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]
    )
    .expect("Failed to register HTTP_RESPONSE_SIZE_BYTES");

    // Domain Metrics

    /// Hospital searches by bed match mode and whether any filter was dropped
    pub static ref HOSPITAL_SEARCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bedfinder_hospital_searches_total",
        "Total number of hospital searches",
        &["bed_match", "ignored_filters"]
    )
    .expect("Failed to register HOSPITAL_SEARCHES_TOTAL");

    /// Hospitals returned per search
    pub static ref HOSPITAL_SEARCH_RESULTS: HistogramVec = register_histogram_vec!(
        "bedfinder_hospital_search_results",
        "Number of hospitals returned by a search",
        &["bed_match"],
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]
    )
    .expect("Failed to register HOSPITAL_SEARCH_RESULTS");

    /// Booking requests accepted, by bed type
    pub static ref BOOKINGS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bedfinder_bookings_created_total",
        "Total number of booking requests recorded",
        &["bed_type"]
    )
    .expect("Failed to register BOOKINGS_CREATED_TOTAL");

    /// Booking status changes by target status
    pub static ref BOOKING_STATUS_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bedfinder_booking_status_updates_total",
        "Total number of booking status updates",
        &["status"]
    )
    .expect("Failed to register BOOKING_STATUS_UPDATES_TOTAL");

    /// Admin login attempts by outcome
    pub static ref ADMIN_LOGINS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bedfinder_admin_logins_total",
        "Total number of admin login attempts",
        &["outcome"]
    )
    .expect("Failed to register ADMIN_LOGINS_TOTAL");

    /// Records held per table
    pub static ref STORE_RECORDS: IntGaugeVec = register_int_gauge_vec!(
        "bedfinder_store_records",
        "Number of records per table",
        &["table"]
    )
    .expect("Failed to register STORE_RECORDS");

    /// Bookings per status
    pub static ref BOOKINGS_BY_STATUS: IntGaugeVec = register_int_gauge_vec!(
        "bedfinder_bookings",
        "Number of bookings by status",
        &["status"]
    )
    .expect("Failed to register BOOKINGS_BY_STATUS");

    // Database Metrics (postgres backend only)

    /// Active database connections
    pub static ref DB_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "bedfinder_db_connections_active",
        "Number of active database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_ACTIVE");

    /// Idle database connections
    pub static ref DB_CONNECTIONS_IDLE: IntGauge = register_int_gauge!(
        "bedfinder_db_connections_idle",
        "Number of idle database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_IDLE");
}

/// Path label for requests that matched no route. Scans of random URLs all
/// land in this one series.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route template of a request (`/api/hospitals/:id`), never the raw path.
pub fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}
