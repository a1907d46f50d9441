use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

/// Names of the hospitals in a search response, in response order.
pub fn hospital_names(response: &Value) -> anyhow::Result<Vec<String>> {
    response["hospitals"]
        .as_array()
        .context("response.hospitals is an array")?
        .iter()
        .map(|h| {
            h["name"]
                .as_str()
                .map(str::to_string)
                .context("hospital.name is a string")
        })
        .collect()
}

/// Assert an API error body with the given code.
pub fn assert_error_code(body: &Value, code: &str) {
    assert_eq!(
        body["error"]["code"].as_str(),
        Some(code),
        "unexpected error body: {body}"
    );
}
