//! Contact form intake. Messages are logged, not delivered.

use axum::{http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::extractors::{trim_in_place, Normalize, ValidatedJson},
    request_context::RequestContext,
    Result,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactMessage {
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 5, max = 200, message = "must be 5 to 200 characters"))]
    pub subject: String,
    #[validate(length(min = 10, max = 1000, message = "must be 10 to 1000 characters"))]
    pub message: String,
}

impl Normalize for ContactMessage {
    fn normalize(mut self) -> Self {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.email);
        trim_in_place(&mut self.subject);
        trim_in_place(&mut self.message);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ContactAccepted {
    pub message: &'static str,
}

/// `POST /api/contact`
pub async fn submit_contact(
    Extension(context): Extension<RequestContext>,
    ValidatedJson(contact): ValidatedJson<ContactMessage>,
) -> Result<(StatusCode, Json<ContactAccepted>)> {
    tracing::info!(
        request_id = %context.request_id,
        subject = %contact.subject,
        message_chars = contact.message.chars().count(),
        "Contact message received"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ContactAccepted {
            message: "Thank you for your message! We will get back to you soon.",
        }),
    ))
}
