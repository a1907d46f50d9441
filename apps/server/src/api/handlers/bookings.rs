//! Booking request submission

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use bedfinder_core::{BookingStatus, NewBooking};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::extractors::{trim_in_place, Normalize, Path, ValidatedJson},
    metrics::BOOKINGS_CREATED_TOTAL,
    request_context::RequestContext,
    state::AppState,
    Error, Result,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub patient_name: String,
    #[validate(range(max = 150, message = "must be between 0 and 150"))]
    pub patient_age: u32,
    #[validate(length(min = 10, max = 15, message = "must be 10 to 15 characters"))]
    pub patient_phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub patient_email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub bed_type: String,
    #[serde(alias = "disease_type")]
    #[validate(length(min = 2, max = 100, message = "must be 2 to 100 characters"))]
    pub medical_condition: String,
    #[validate(length(min = 10, max = 15, message = "must be 10 to 15 characters"))]
    pub emergency_contact: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub special_requirements: Option<String>,
}

impl Normalize for BookingRequest {
    fn normalize(mut self) -> Self {
        for field in [
            &mut self.patient_name,
            &mut self.patient_phone,
            &mut self.patient_email,
            &mut self.bed_type,
            &mut self.medical_condition,
            &mut self.emergency_contact,
        ] {
            trim_in_place(field);
        }
        self.special_requirements = self
            .special_requirements
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

impl BookingRequest {
    fn into_new_booking(self, hospital_id: i64) -> NewBooking {
        NewBooking {
            hospital_id,
            patient_name: self.patient_name,
            patient_age: self.patient_age,
            patient_phone: self.patient_phone,
            patient_email: self.patient_email,
            bed_type: self.bed_type,
            medical_condition: self.medical_condition,
            emergency_contact: self.emergency_contact,
            special_requirements: self.special_requirements,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingCreated {
    pub id: i64,
    pub hospital_id: i64,
    pub status: BookingStatus,
    pub message: String,
}

/// `POST /api/hospitals/:id/bookings`
pub async fn create_booking(
    State(state): State<AppState>,
    Path(hospital_id): Path<i64>,
    Extension(context): Extension<RequestContext>,
    ValidatedJson(request): ValidatedJson<BookingRequest>,
) -> Result<(StatusCode, Json<BookingCreated>)> {
    let hospital = state
        .hospitals
        .get_by_id(hospital_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Hospital {hospital_id}")))?;

    if !hospital
        .bookable_bed_types()
        .contains(&request.bed_type.as_str())
    {
        return Err(Error::Validation(format!(
            "Bed type '{}' is not available at {}",
            request.bed_type, hospital.name
        )));
    }

    let bed_type = request.bed_type.clone();
    let id = state
        .bookings
        .create(request.into_new_booking(hospital_id))
        .await?;

    BOOKINGS_CREATED_TOTAL.with_label_values(&[&bed_type]).inc();
    tracing::info!(
        request_id = %context.request_id,
        booking_id = id,
        hospital_id,
        "Booking submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            id,
            hospital_id,
            status: BookingStatus::Pending,
            message: format!("Booking submitted successfully! Your booking ID is: {id}"),
        }),
    ))
}
