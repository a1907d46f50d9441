#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bedfinder_core::{MemoryStore, RecordStore};
use bedfinder_server::{api::create_router, state::AppStateOptions, AppState, Config};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

pub use assertions::*;
pub use fixtures::*;

/// Router over an in-memory store seeded with the sample hospitals and the
/// default `admin` / `admin123` account.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {}).await
    }

    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.auth.jwt_secret = "integration-test-secret-with-enough-bytes".to_string();
        configure(&mut config);

        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let state = AppState::new_with_options(
            config,
            AppStateOptions {
                store: Some(store),
                seed_sample_data: Some(true),
            },
        )
        .await
        .context("initialize AppState")?;

        Ok(Self {
            router: create_router(state.clone()),
            state,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_headers(method, path_and_query, body, &[])
            .await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Value>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(json) => Body::from(serde_json::to_vec(&json).context("encode body")?),
            None => Body::empty(),
        };
        let request = builder.body(body).context("build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    pub async fn get_json(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _, body) = self.request(Method::GET, path_and_query, None).await?;
        Ok((status, parse_json(&body)?))
    }

    pub async fn post_json(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _, body) = self.request(Method::POST, path, Some(body)).await?;
        Ok((status, parse_json(&body)?))
    }

    /// Log in with the seeded admin and return the bearer token.
    pub async fn admin_token(&self) -> anyhow::Result<String> {
        let (status, body) = self
            .post_json(
                "/admin/login",
                serde_json::json!({"username": "admin", "password": "admin123"}),
            )
            .await?;
        assert_status(status, StatusCode::OK, "admin login");
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carries a token")
    }

    pub async fn admin_request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let authorization = format!("Bearer {token}");
        let (status, _, body) = self
            .request_with_headers(method, path, body, &[("authorization", &authorization)])
            .await?;
        Ok((status, parse_json(&body)?))
    }
}

pub fn parse_json(body: &Bytes) -> anyhow::Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).with_context(|| {
        format!(
            "response body is not JSON: {}",
            String::from_utf8_lossy(body)
        )
    })
}
