//! Hospital filter engine
//!
//! One pure filtering pass shared by the repository, the HTTP search routes
//! and the CLI. Every active criterion narrows the listing (AND semantics);
//! absent or empty criteria impose no constraint. The source order is kept
//! and the input slice is never modified.
//!
//! Bed-type matching has two modes, selected by [`BedMatch`]:
//! - `Listed`: the hospital lists the bed type
//! - `Available`: the hospital lists it and has at least one bed of that type free

use crate::models::Hospital;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedMatch {
    #[default]
    Listed,
    Available,
}

impl FromStr for BedMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "listed" => Ok(BedMatch::Listed),
            "available" => Ok(BedMatch::Available),
            other => Err(format!(
                "unknown bed match mode '{other}' (expected listed or available)"
            )),
        }
    }
}

impl fmt::Display for BedMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BedMatch::Listed => f.write_str("listed"),
            BedMatch::Available => f.write_str("available"),
        }
    }
}

/// Optional constraints narrowing a hospital listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Case-insensitive substring of the hospital name.
    pub name: Option<String>,
    /// Case-insensitive substring of the hospital location.
    pub location: Option<String>,
    /// Exact entry of `disease_types`.
    pub disease_type: Option<String>,
    /// Exact entry of `bed_types`; see [`BedMatch`].
    pub bed_type: Option<String>,
    pub min_rating: Option<f64>,
    pub max_fees: Option<f64>,
    /// Every facility must be offered.
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub bed_match: BedMatch,
}

/// A query parameter that was dropped because its value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCriteria {
    pub criteria: SearchCriteria,
    pub rejected: Vec<RejectedParam>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl SearchCriteria {
    /// Criteria that match every hospital, with the given bed-match mode.
    pub fn new(bed_match: BedMatch) -> Self {
        Self {
            bed_match,
            ..Self::default()
        }
    }

    /// Build criteria from raw query parameters.
    ///
    /// Recognized keys: `name`, `location` (`city`), `disease_type`
    /// (`specialty`), `bed_type`, `min_rating`, `max_fees` (`max_fee`),
    /// `facilities` (`facility`, repeatable), `bed_match`, `availability`.
    /// For single-valued keys the last occurrence wins. Unknown keys are
    /// ignored. Values that fail to parse drop the criterion and are listed
    /// in [`ParsedCriteria::rejected`].
    pub fn from_pairs<I, K, V>(pairs: I, default_bed_match: BedMatch) -> ParsedCriteria
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = SearchCriteria::new(default_bed_match);
        let mut rejected = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            let mut reject = || {
                rejected.push(RejectedParam {
                    name: key.to_string(),
                    value: value.to_string(),
                })
            };

            match key {
                "name" => criteria.name = Some(value.to_string()),
                "location" | "city" => criteria.location = Some(value.to_string()),
                "disease_type" | "specialty" => criteria.disease_type = Some(value.to_string()),
                "bed_type" => criteria.bed_type = Some(value.to_string()),
                "min_rating" | "max_fees" | "max_fee" => {
                    if value.trim().is_empty() {
                        continue;
                    }
                    match parse_number(value) {
                        Some(n) if key == "min_rating" => criteria.min_rating = Some(n),
                        Some(n) => criteria.max_fees = Some(n),
                        None => reject(),
                    }
                }
                "facilities" | "facility" => {
                    if !value.is_empty() {
                        criteria.facilities.push(value.to_string());
                    }
                }
                "bed_match" => {
                    if value.trim().is_empty() {
                        continue;
                    }
                    match value.parse() {
                        Ok(mode) => criteria.bed_match = mode,
                        Err(_) => reject(),
                    }
                }
                "availability" => {
                    if value.trim().is_empty() {
                        continue;
                    }
                    match parse_flag(value) {
                        Some(true) => criteria.bed_match = BedMatch::Available,
                        Some(false) => criteria.bed_match = BedMatch::Listed,
                        None => reject(),
                    }
                }
                _ => {}
            }
        }

        if !rejected.is_empty() {
            tracing::debug!(rejected = ?rejected, "Ignoring malformed search parameters");
        }

        ParsedCriteria { criteria, rejected }
    }

    /// True when no criterion constrains the listing.
    pub fn is_unconstrained(&self) -> bool {
        non_empty(&self.name).is_none()
            && non_empty(&self.location).is_none()
            && non_empty(&self.disease_type).is_none()
            && non_empty(&self.bed_type).is_none()
            && self.min_rating.is_none()
            && self.max_fees.is_none()
            && self.facilities.iter().all(String::is_empty)
    }

    pub fn matches(&self, hospital: &Hospital) -> bool {
        if let Some(name) = non_empty(&self.name) {
            if !contains_ignore_case(&hospital.name, name) {
                return false;
            }
        }

        if let Some(location) = non_empty(&self.location) {
            if !contains_ignore_case(&hospital.location, location) {
                return false;
            }
        }

        if let Some(disease) = non_empty(&self.disease_type) {
            if !hospital.disease_types.iter().any(|d| d == disease) {
                return false;
            }
        }

        if let Some(bed_type) = non_empty(&self.bed_type) {
            let matched = match self.bed_match {
                BedMatch::Listed => hospital.lists_bed_type(bed_type),
                BedMatch::Available => {
                    hospital.lists_bed_type(bed_type) && hospital.available(bed_type) > 0
                }
            };
            if !matched {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if hospital.doctor_rating < min_rating {
                return false;
            }
        }

        if let Some(max_fees) = self.max_fees {
            if hospital.consultation_fee > max_fees {
                return false;
            }
        }

        self.facilities
            .iter()
            .filter(|f| !f.is_empty())
            .all(|wanted| hospital.facilities.iter().any(|f| f == wanted))
    }
}

/// Apply `criteria` to `hospitals`, returning the matching records in source order.
pub fn filter_hospitals(hospitals: &[Hospital], criteria: &SearchCriteria) -> Vec<Hospital> {
    hospitals
        .iter()
        .filter(|h| criteria.matches(h))
        .cloned()
        .collect()
}

/// Distinct values present across a hospital collection, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub locations: Vec<String>,
    pub disease_types: Vec<String>,
    pub facilities: Vec<String>,
    pub bed_types: Vec<String>,
}

impl Facets {
    pub fn collect(hospitals: &[Hospital]) -> Self {
        let mut locations = BTreeSet::new();
        let mut disease_types = BTreeSet::new();
        let mut facilities = BTreeSet::new();
        let mut bed_types = BTreeSet::new();

        for hospital in hospitals {
            locations.insert(hospital.location.clone());
            disease_types.extend(hospital.disease_types.iter().cloned());
            facilities.extend(hospital.facilities.iter().cloned());
            bed_types.extend(hospital.bed_types.iter().cloned());
        }

        Self {
            locations: locations.into_iter().collect(),
            disease_types: disease_types.into_iter().collect(),
            facilities: facilities.into_iter().collect(),
            bed_types: bed_types.into_iter().collect(),
        }
    }
}
