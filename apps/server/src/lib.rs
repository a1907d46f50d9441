//! Bedfinder server
//!
//! HTTP front end over the hospital directory:
//! - public hospital search, facets and detail pages
//! - booking request and contact form intake
//! - admin login (JWT) and booking status management
//! - Prometheus metrics, request ids and structured logging

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod request_context;
pub mod startup;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
