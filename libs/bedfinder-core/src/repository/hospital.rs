use super::HOSPITALS_TABLE;
use crate::{
    filter::{filter_hospitals, Facets, SearchCriteria},
    models::Hospital,
    store::{RecordStore, Table},
    Result,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct HospitalRepository {
    table: Table<Hospital>,
}

impl HospitalRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            table: Table::new(store, HOSPITALS_TABLE),
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Hospital>> {
        self.table.all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Hospital>> {
        self.table.get(id).await
    }

    /// Store a hospital and return its assigned id. `hospital.id` is ignored.
    pub async fn create(&self, hospital: &Hospital) -> Result<i64> {
        let unlisted = hospital.unlisted_bed_types();
        if !unlisted.is_empty() {
            tracing::warn!(
                hospital = %hospital.name,
                bed_types = ?unlisted,
                "Available beds reference bed types the hospital does not list"
            );
        }
        self.table.insert(hospital).await
    }

    /// Hospitals matching every active criterion, in id order.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Hospital>> {
        let hospitals = self.table.all().await?;
        let matched = filter_hospitals(&hospitals, criteria);
        tracing::debug!(
            candidates = hospitals.len(),
            matched = matched.len(),
            "Hospital search"
        );
        Ok(matched)
    }

    pub async fn facets(&self) -> Result<Facets> {
        Ok(Facets::collect(&self.table.all().await?))
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.table.all().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.table.is_empty().await
    }
}
