//! Error types for the Bedfinder core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record {table}/{id}: {message}")]
    Decode {
        table: String,
        id: i64,
        message: String,
    },

    #[error("Invalid record for table {table}: {message}")]
    InvalidRecord { table: String, message: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
