use serde_json::{json, Value};

/// A booking request body that passes validation.
pub fn booking_request(bed_type: &str) -> Value {
    json!({
        "patient_name": "Jane Roe",
        "patient_age": 42,
        "patient_phone": "+1-555-010-0100",
        "patient_email": "jane.roe@example.com",
        "bed_type": bed_type,
        "medical_condition": "Chest pain observation",
        "emergency_contact": "+1-555-010-0199",
        "special_requirements": "Wheelchair access"
    })
}

pub fn contact_message() -> Value {
    json!({
        "name": "John Smith",
        "email": "john@example.com",
        "subject": "Visiting hours",
        "message": "What are the visiting hours for the ICU ward?"
    })
}

/// Hospital with listed ICU beds but none free.
pub fn hospital_without_icu_beds() -> Value {
    json!({
        "name": "Riverside Clinic",
        "location": "Riverside",
        "address": "1 River Rd",
        "phone": "+1-555-010-0300",
        "email": "info@riverside.example",
        "description": "Small clinic",
        "disease_types": ["General Medicine"],
        "bed_types": ["ICU", "General"],
        "available_beds": {"ICU": 0, "General": 4},
        "doctor_rating": 4.0,
        "success_rate": 90.0,
        "consultation_fee": 80.0,
        "facilities": ["Laboratory"]
    })
}
