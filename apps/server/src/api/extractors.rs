//! Custom Axum extractors.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Request,
    },
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::Error;

/// Request bodies that are tidied up before validation.
pub trait Normalize {
    fn normalize(self) -> Self;
}

/// JSON body that has been normalized and passed `validator` checks.
///
/// Malformed JSON and failed field checks both become `400` responses in the
/// API error shape.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Normalize,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| Error::Validation(rejection.body_text()))?;

        let body = body.normalize();
        body.validate()?;
        Ok(ValidatedJson(body))
    }
}

/// Path parameters whose parse failures answer in the API error shape
/// instead of axum's plain-text rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

/// Trim surrounding whitespace in place.
pub fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
