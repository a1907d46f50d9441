use super::BOOKINGS_TABLE;
use crate::{
    models::{Booking, BookingStatus, NewBooking},
    store::{Record, RecordStore, Table},
    Result,
};
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;

#[derive(Clone)]
pub struct BookingRepository {
    table: Table<Booking>,
}

impl BookingRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            table: Table::new(store, BOOKINGS_TABLE),
        }
    }

    /// Record a booking request with status `pending` and return its id.
    ///
    /// The hospital reference is not checked here.
    pub async fn create(&self, request: NewBooking) -> Result<i64> {
        let booking = Booking::from_request(request, Utc::now());
        let id = self.table.insert(&booking).await?;
        tracing::info!(
            booking_id = id,
            hospital_id = booking.hospital_id,
            bed_type = %booking.bed_type,
            "Booking request recorded"
        );
        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<Booking>> {
        self.table.all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Booking>> {
        self.table.get(id).await
    }

    pub async fn get_by_hospital(&self, hospital_id: i64) -> Result<Vec<Booking>> {
        Ok(self
            .table
            .all()
            .await?
            .into_iter()
            .filter(|b| b.hospital_id == hospital_id)
            .collect())
    }

    /// Overwrite the status of a booking. Any status may follow any other.
    ///
    /// Returns `false` when the booking does not exist.
    pub async fn update_status(&self, id: i64, status: BookingStatus) -> Result<bool> {
        let mut changes = Record::new();
        changes.insert(
            "status".to_string(),
            JsonValue::String(status.as_str().to_string()),
        );
        let updated = self.table.update_fields(id, changes).await?;
        if updated {
            tracing::info!(booking_id = id, status = %status, "Booking status updated");
        }
        Ok(updated)
    }

    pub async fn count_by_status(&self, status: BookingStatus) -> Result<usize> {
        Ok(self
            .table
            .all()
            .await?
            .iter()
            .filter(|b| b.status == status)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(hospital_id: i64, patient: &str) -> NewBooking {
        NewBooking {
            hospital_id,
            patient_name: patient.to_string(),
            patient_age: 42,
            patient_phone: "+1-555-0100".to_string(),
            patient_email: "patient@example.com".to_string(),
            bed_type: "ICU".to_string(),
            medical_condition: "Observation".to_string(),
            emergency_contact: "+1-555-0199".to_string(),
            special_requirements: Some("   ".to_string()),
        }
    }

    #[tokio::test]
    async fn create_defaults_to_pending() {
        let repo = BookingRepository::new(Arc::new(MemoryStore::new()));
        let id = repo.create(request(1, "Jane Roe")).await.unwrap();

        let booking = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.patient_name, "Jane Roe");
        assert_eq!(booking.special_requirements, None);
    }

    #[tokio::test]
    async fn get_by_hospital_matches_exactly() {
        let repo = BookingRepository::new(Arc::new(MemoryStore::new()));
        repo.create(request(1, "A")).await.unwrap();
        repo.create(request(2, "B")).await.unwrap();
        repo.create(request(1, "C")).await.unwrap();
        repo.create(request(11, "D")).await.unwrap();

        let names: Vec<String> = repo
            .get_by_hospital(1)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.patient_name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!(repo.get_by_hospital(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_status_overwrites_unconditionally() {
        let repo = BookingRepository::new(Arc::new(MemoryStore::new()));
        let id = repo.create(request(1, "A")).await.unwrap();

        assert!(repo.update_status(id, BookingStatus::Cancelled).await.unwrap());
        assert!(repo.update_status(id, BookingStatus::Confirmed).await.unwrap());
        assert_eq!(
            repo.get_by_id(id).await.unwrap().unwrap().status,
            BookingStatus::Confirmed
        );
        assert!(!repo.update_status(99, BookingStatus::Confirmed).await.unwrap());
    }

    #[tokio::test]
    async fn count_by_status() {
        let repo = BookingRepository::new(Arc::new(MemoryStore::new()));
        let first = repo.create(request(1, "A")).await.unwrap();
        repo.create(request(1, "B")).await.unwrap();
        repo.update_status(first, BookingStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(repo.count_by_status(BookingStatus::Pending).await.unwrap(), 1);
        assert_eq!(repo.count_by_status(BookingStatus::Confirmed).await.unwrap(), 1);
        assert_eq!(repo.count_by_status(BookingStatus::Cancelled).await.unwrap(), 0);
    }
}
