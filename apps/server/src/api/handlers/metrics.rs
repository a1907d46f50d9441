//! Metrics endpoint handler
//!
//! Exposes Prometheus-compatible metrics for monitoring

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bedfinder_core::BookingStatus;
use prometheus::{Encoder, TextEncoder};

use crate::{
    metrics::{BOOKINGS_BY_STATUS, DB_CONNECTIONS_ACTIVE, DB_CONNECTIONS_IDLE, STORE_RECORDS},
    state::AppState,
};

/// Refresh gauges that are read from the store rather than counted inline.
async fn refresh_store_gauges(state: &AppState) -> crate::Result<()> {
    let hospitals = state.hospitals.count().await?;
    let bookings = state.bookings.get_all().await?;
    let admins = state.admins.get_all().await?.len();
    let blog_posts = state.blog.count().await?;

    STORE_RECORDS
        .with_label_values(&["hospitals"])
        .set(hospitals as i64);
    STORE_RECORDS
        .with_label_values(&["bookings"])
        .set(bookings.len() as i64);
    STORE_RECORDS.with_label_values(&["admins"]).set(admins as i64);
    STORE_RECORDS
        .with_label_values(&["blog_posts"])
        .set(blog_posts as i64);

    for status in BookingStatus::ALL {
        let count = bookings.iter().filter(|b| b.status == status).count();
        BOOKINGS_BY_STATUS
            .with_label_values(&[status.as_str()])
            .set(count as i64);
    }

    if let Some(pool) = &state.db_pool {
        let idle = pool.num_idle() as i64;
        DB_CONNECTIONS_ACTIVE.set(pool.size() as i64 - idle);
        DB_CONNECTIONS_IDLE.set(idle);
    }
    Ok(())
}

/// `GET /metrics` in Prometheus text format
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = refresh_store_gauges(&state).await {
        tracing::warn!(error = %e, "Failed to refresh store gauges");
    }

    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "text/plain")],
                b"Failed to encode metrics".to_vec(),
            )
        }
    }
}
