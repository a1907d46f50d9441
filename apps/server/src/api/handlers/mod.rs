//! Request handlers

pub mod admin;
pub mod blog;
pub mod bookings;
pub mod contact;
pub mod hospitals;
pub mod metrics;
