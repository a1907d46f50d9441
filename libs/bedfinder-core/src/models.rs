//! Entity records stored in the hospital, booking, admin and blog tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A hospital listed in the directory.
///
/// Apart from `available_beds`, records are immutable once seeded. `id` is
/// assigned by the record store; a value supplied on create is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(alias = "city")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "specialties")]
    pub disease_types: Vec<String>,
    #[serde(default)]
    pub bed_types: Vec<String>,
    #[serde(default)]
    pub available_beds: BTreeMap<String, u32>,
    #[serde(default)]
    pub doctor_rating: f64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub consultation_fee: f64,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Hospital {
    /// Sum of available beds across all bed types.
    pub fn total_beds(&self) -> u32 {
        self.available_beds.values().sum()
    }

    /// Available count for a bed type, zero when the type is not tracked.
    pub fn available(&self, bed_type: &str) -> u32 {
        self.available_beds.get(bed_type).copied().unwrap_or(0)
    }

    pub fn lists_bed_type(&self, bed_type: &str) -> bool {
        self.bed_types.iter().any(|b| b == bed_type)
    }

    /// Bed types that can currently be requested: listed with a positive count.
    pub fn bookable_bed_types(&self) -> Vec<&str> {
        self.bed_types
            .iter()
            .filter(|b| self.available(b) > 0)
            .map(String::as_str)
            .collect()
    }

    /// Keys of `available_beds` missing from `bed_types`.
    ///
    /// The two are expected to agree but nothing enforces it.
    pub fn unlisted_bed_types(&self) -> Vec<&str> {
        self.available_beds
            .keys()
            .filter(|k| !self.lists_bed_type(k))
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown booking status '{}' (expected pending, confirmed or cancelled)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Booking request as submitted by a visitor, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub hospital_id: i64,
    pub patient_name: String,
    pub patient_age: u32,
    pub patient_phone: String,
    pub patient_email: String,
    pub bed_type: String,
    pub medical_condition: String,
    pub emergency_contact: String,
    #[serde(default)]
    pub special_requirements: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default)]
    pub id: i64,
    pub hospital_id: i64,
    pub patient_name: String,
    #[serde(default)]
    pub patient_age: u32,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub patient_email: String,
    pub bed_type: String,
    #[serde(default, alias = "disease_type")]
    pub medical_condition: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(alias = "booking_date")]
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_request(request: NewBooking, created_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            hospital_id: request.hospital_id,
            patient_name: request.patient_name,
            patient_age: request.patient_age,
            patient_phone: request.patient_phone,
            patient_email: request.patient_email,
            bed_type: request.bed_type,
            medical_condition: request.medical_condition,
            emergency_contact: request.emergency_contact,
            special_requirements: request
                .special_requirements
                .filter(|s| !s.trim().is_empty()),
            status: BookingStatus::Pending,
            created_at,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Admin view safe to hand to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    pub username: String,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
        }
    }
}

/// A health guide article. Only published posts are visible to visitors;
/// `slug` is the public key and is unique across the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default = "default_author")]
    pub author: String,
    pub published_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

fn default_author() -> String {
    "Bedfinder Team".to_string()
}

fn default_true() -> bool {
    true
}
