//! Public hospital directory handlers

use axum::{
    extract::{RawQuery, State},
    Json,
};
use bedfinder_core::{Hospital, RejectedParam, SearchCriteria};
use serde::Serialize;

use crate::{
    api::extractors::Path,
    metrics::{HOSPITAL_SEARCHES_TOTAL, HOSPITAL_SEARCH_RESULTS},
    state::AppState,
    Error, Result,
};

/// A hospital plus derived fields for display.
#[derive(Debug, Serialize)]
pub struct HospitalView {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub total_beds: u32,
}

impl From<Hospital> for HospitalView {
    fn from(hospital: Hospital) -> Self {
        Self {
            total_beds: hospital.total_beds(),
            hospital,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub criteria: SearchCriteria,
    /// Parameters dropped because their values did not parse.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<RejectedParam>,
    pub hospitals: Vec<HospitalView>,
}

fn describe(rejected: &[RejectedParam]) -> String {
    rejected
        .iter()
        .map(|p| format!("{}={:?}", p.name, p.value))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn run_search(
    state: &AppState,
    criteria: SearchCriteria,
    ignored: Vec<RejectedParam>,
) -> Result<SearchResponse> {
    let hospitals = state.hospitals.search(&criteria).await?;

    let bed_match = criteria.bed_match.to_string();
    HOSPITAL_SEARCHES_TOTAL
        .with_label_values(&[&bed_match, if ignored.is_empty() { "false" } else { "true" }])
        .inc();
    HOSPITAL_SEARCH_RESULTS
        .with_label_values(&[&bed_match])
        .observe(hospitals.len() as f64);

    Ok(SearchResponse {
        total: hospitals.len(),
        criteria,
        ignored,
        hospitals: hospitals.into_iter().map(HospitalView::from).collect(),
    })
}

/// `GET /api/hospitals`
pub async fn search_hospitals(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<SearchResponse>> {
    let pairs = url::form_urlencoded::parse(query.as_deref().unwrap_or_default().as_bytes());
    let parsed = SearchCriteria::from_pairs(pairs, state.config.search.default_bed_match);

    if state.config.search.strict_filters && !parsed.rejected.is_empty() {
        return Err(Error::Validation(format!(
            "Malformed search parameters: {}",
            describe(&parsed.rejected)
        )));
    }

    Ok(Json(run_search(&state, parsed.criteria, parsed.rejected).await?))
}

/// `GET /api/cities/:city`
pub async fn city_hospitals(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<SearchResponse>> {
    let criteria = SearchCriteria {
        location: Some(city),
        ..SearchCriteria::new(state.config.search.default_bed_match)
    };
    Ok(Json(run_search(&state, criteria, Vec::new()).await?))
}

/// `GET /api/hospitals/:id`
pub async fn get_hospital(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<HospitalView>> {
    state
        .hospitals
        .get_by_id(id)
        .await?
        .map(|hospital| Json(HospitalView::from(hospital)))
        .ok_or_else(|| Error::NotFound(format!("Hospital {id}")))
}

/// `GET /api/hospitals/facets`
pub async fn hospital_facets(
    State(state): State<AppState>,
) -> Result<Json<bedfinder_core::Facets>> {
    Ok(Json(state.hospitals.facets().await?))
}
