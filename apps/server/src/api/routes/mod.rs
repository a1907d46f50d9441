//! Route tables

pub mod admin;
pub mod hospitals;
pub mod metrics;
