//! Record store abstraction
//!
//! A record store keeps one table per entity kind. Every record is a flat JSON
//! object carrying an integer `id` assigned by the store. Backends:
//! - [`MemoryStore`]: process-local tables, used by tests and ephemeral setups
//! - [`JsonFileStore`]: a single JSON document on disk, re-read on every call
//!
//! The server crate adds a PostgreSQL backend implementing the same trait.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;
use std::sync::Arc;

/// A stored record: a flat mapping of named fields.
pub type Record = serde_json::Map<String, JsonValue>;

/// Core storage trait for keyed records.
///
/// Ids are issued per table and are strictly increasing: a deleted id is
/// never handed out again. Unknown ids are reported through `None` / `false`,
/// never as errors. Every mutation is durable when the call returns.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend identifier for logs ("memory", "json_file", ...).
    fn backend_name(&self) -> &'static str;

    /// All records of a table in ascending id order.
    async fn get_all(&self, table: &str) -> Result<Vec<Record>>;

    async fn get_by_id(&self, table: &str, id: i64) -> Result<Option<Record>>;

    /// Insert a record and return the id assigned to it.
    ///
    /// An `id` field present in `data` is overwritten.
    async fn create(&self, table: &str, data: Record) -> Result<i64>;

    /// Merge `changes` into an existing record. The `id` field is immutable.
    ///
    /// Returns `false` when no record has this id.
    async fn update(&self, table: &str, id: i64, changes: Record) -> Result<bool>;

    /// Returns `false` when no record has this id.
    async fn delete(&self, table: &str, id: i64) -> Result<bool>;
}

pub(crate) fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(JsonValue::as_i64)
}

/// Table contents shared by the in-process backends.
///
/// `last_id` is the highest id ever issued; it survives deletes so ids are
/// not reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TableData {
    #[serde(default)]
    pub last_id: i64,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl TableData {
    pub fn insert(&mut self, mut data: Record) -> i64 {
        let highest_existing = self.records.iter().filter_map(record_id).max().unwrap_or(0);
        let id = self.last_id.max(highest_existing) + 1;
        self.last_id = id;
        data.insert("id".to_string(), JsonValue::from(id));
        self.records.push(data);
        id
    }

    pub fn find(&self, id: i64) -> Option<&Record> {
        self.records.iter().find(|r| record_id(r) == Some(id))
    }

    pub fn merge(&mut self, id: i64, changes: Record) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| record_id(r) == Some(id)) else {
            return false;
        };
        for (key, value) in changes {
            if key != "id" {
                record.insert(key, value);
            }
        }
        true
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| record_id(r) != Some(id));
        self.records.len() != before
    }

    pub fn sorted_records(&self) -> Vec<Record> {
        let mut records = self.records.clone();
        records.sort_by_key(|r| record_id(r).unwrap_or(0));
        records
    }
}

/// Typed view over one table of a [`RecordStore`].
///
/// Converts between entity structs and stored records. Unknown fields are
/// ignored when decoding. A record that does not fit the entity shape is
/// logged and left out of reads, so one damaged row cannot take down a
/// whole listing.
pub struct Table<T> {
    store: Arc<dyn RecordStore>,
    name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name,
            _entity: PhantomData,
        }
    }
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn RecordStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _entity: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Every decodable record, in id order.
    pub async fn all(&self) -> Result<Vec<T>> {
        Ok(self
            .store
            .get_all(self.name)
            .await?
            .into_iter()
            .filter_map(|record| self.decode_or_skip(record))
            .collect())
    }

    /// `None` for an unknown id and for a record that does not decode.
    pub async fn get(&self, id: i64) -> Result<Option<T>> {
        Ok(self
            .store
            .get_by_id(self.name, id)
            .await?
            .and_then(|record| self.decode_or_skip(record)))
    }

    pub async fn insert<N: Serialize>(&self, entity: &N) -> Result<i64> {
        let record = self.encode(entity)?;
        self.store.create(self.name, record).await
    }

    pub async fn update_fields(&self, id: i64, changes: Record) -> Result<bool> {
        self.store.update(self.name, id, changes).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.store.delete(self.name, id).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.store.get_all(self.name).await?.is_empty())
    }

    fn decode(&self, record: Record) -> Result<T> {
        let id = record_id(&record).unwrap_or_default();
        serde_json::from_value(JsonValue::Object(record)).map_err(|e| Error::Decode {
            table: self.name.to_string(),
            id,
            message: e.to_string(),
        })
    }

    fn decode_or_skip(&self, record: Record) -> Option<T> {
        match self.decode(record) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(table = self.name, error = %e, "Skipping undecodable record");
                None
            }
        }
    }

    fn encode<N: Serialize>(&self, entity: &N) -> Result<Record> {
        match serde_json::to_value(entity)? {
            JsonValue::Object(mut map) => {
                map.remove("id");
                Ok(map)
            }
            other => Err(Error::InvalidRecord {
                table: self.name.to_string(),
                message: format!("expected a JSON object, got {other}"),
            }),
        }
    }
}
