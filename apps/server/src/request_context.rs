//! Per-request context injected by the request id middleware.

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    /// Client-supplied `x-request-id`, when it differs from ours.
    pub correlation_id: Option<String>,
}
