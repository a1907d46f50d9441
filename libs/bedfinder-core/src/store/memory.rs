//! In-memory record store

use super::{Record, RecordStore, TableData};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Record store keeping every table in process memory.
///
/// Clones share the same tables. Id allocation happens under the write lock,
/// so concurrent creates never observe the same high-water mark.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, TableData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_all(&self, table: &str) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(TableData::sorted_records)
            .unwrap_or_default())
    }

    async fn get_by_id(&self, table: &str, id: i64) -> Result<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|t| t.find(id)).cloned())
    }

    async fn create(&self, table: &str, data: Record) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let id = tables.entry(table.to_string()).or_default().insert(data);
        tracing::debug!(table, id, "Record created");
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, changes: Record) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .map(|t| t.merge(id, changes))
            .unwrap_or(false))
    }

    async fn delete(&self, table: &str, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.get_mut(table).map(|t| t.remove(id)).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn crud_roundtrip() {
        let store = MemoryStore::new();

        let id = store
            .create("bookings", record(json!({"status": "pending"})))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let fetched = store.get_by_id("bookings", id).await.unwrap().unwrap();
        assert_eq!(fetched.get("status"), Some(&json!("pending")));

        assert!(store
            .update("bookings", id, record(json!({"status": "confirmed"})))
            .await
            .unwrap());
        let fetched = store.get_by_id("bookings", id).await.unwrap().unwrap();
        assert_eq!(fetched.get("status"), Some(&json!("confirmed")));

        assert!(store.delete("bookings", id).await.unwrap());
        assert!(store.get_by_id("bookings", id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_errors() {
        let store = MemoryStore::new();
        assert!(store.get_by_id("hospitals", 5).await.unwrap().is_none());
        assert!(!store.update("hospitals", 5, Record::new()).await.unwrap());
        assert!(!store.delete("hospitals", 5).await.unwrap());
        assert!(store.get_all("hospitals").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store.create("admins", Record::new()).await.unwrap();
        }
        assert!(store.delete("admins", 3).await.unwrap());

        let next = store.create("admins", Record::new()).await.unwrap();
        assert_eq!(next, 4);

        let ids: Vec<i64> = store
            .get_all("admins")
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.get("id").and_then(|v| v.as_i64()))
            .collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn tables_are_independent() {
        let store = MemoryStore::new();
        assert_eq!(store.create("hospitals", Record::new()).await.unwrap(), 1);
        assert_eq!(store.create("bookings", Record::new()).await.unwrap(), 1);
        assert_eq!(store.create("hospitals", Record::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create("bookings", Record::new()).await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(ids.last(), Some(&32));
    }
}
