//! Request ID middleware with OpenTelemetry trace context injection

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use opentelemetry::trace::{TraceContextExt, TraceId};
use std::time::Instant;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use crate::request_context::RequestContext;

/// Request ID middleware with OpenTelemetry trace context injection
///
/// Creates the root span for each HTTP request and:
/// - Generates a server request ID and returns it as `x-request-id`
/// - Echoes a differing client-supplied ID back as `x-correlation-id`
/// - Adds the trace id as `x-trace-id` when OpenTelemetry is recording
/// - Labels the span with the route template, never the raw path
#[tracing::instrument(
    name = "http_request",
    skip_all,
    fields(
        http.method = %req.method(),
        http.route = %crate::metrics::route_label(&req),
        otel.kind = "server",
        http.response.status_code = tracing::field::Empty,
        request_id = tracing::field::Empty,
    )
)]
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let span = Span::current();
    let start = Instant::now();

    // Server-assigned id; client ids are never reused as our own.
    let server_id = Uuid::new_v4().to_string();
    span.record("request_id", server_id.as_str());

    let correlation_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != server_id)
        .map(String::from);

    // Make request ID available to inner middleware/handlers.
    req.extensions_mut().insert(RequestContext {
        request_id: server_id.clone(),
        correlation_id: correlation_id.clone(),
    });

    // Log incoming request
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::debug!(method = %method, path = %path, "Incoming request");

    let mut response = next.run(req).await;

    let status = response.status();
    span.record("http.response.status_code", status.as_u16());

    // Log request completion
    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    // Add request context to response headers
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&server_id) {
        headers.insert("x-request-id", value);
    }

    // Trace ID for debugging; absent when no exporter is recording.
    let trace_id = span.context().span().span_context().trace_id();
    if trace_id != TraceId::INVALID {
        if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
            headers.insert("x-trace-id", value);
        }
    }

    // Echo client correlation ID if different
    if let Some(client_id) = correlation_id {
        if let Ok(value) = HeaderValue::from_str(&client_id) {
            headers.insert("x-correlation-id", value);
        }
    }

    response
}
