//! JSON file record store
//!
//! All tables live in one JSON document:
//!
//! ```json
//! {
//!   "hospitals": { "last_id": 6, "records": [ { "id": 1, "name": "..." } ] },
//!   "bookings":  { "last_id": 0, "records": [] }
//! }
//! ```
//!
//! The document is read from disk on every call and written back on every
//! mutation. Writes go to a sibling temporary file that is renamed over the
//! original, so readers never observe a half-written document.

use super::{Record, RecordStore, TableData};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Document = BTreeMap<String, TableData>;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Run `mutate` against the table and persist the document when it reports a change.
    async fn modify<R>(
        &self,
        table: &str,
        mutate: impl FnOnce(&mut TableData) -> (R, bool),
    ) -> Result<R> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        let (result, changed) = mutate(document.entry(table.to_string()).or_default());
        if changed {
            self.persist(&document).await?;
        }
        Ok(result)
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "json_file"
    }

    async fn get_all(&self, table: &str) -> Result<Vec<Record>> {
        let document = self.load().await?;
        Ok(document
            .get(table)
            .map(TableData::sorted_records)
            .unwrap_or_default())
    }

    async fn get_by_id(&self, table: &str, id: i64) -> Result<Option<Record>> {
        let document = self.load().await?;
        Ok(document.get(table).and_then(|t| t.find(id)).cloned())
    }

    async fn create(&self, table: &str, data: Record) -> Result<i64> {
        let id = self.modify(table, |t| (t.insert(data), true)).await?;
        tracing::debug!(table, id, path = %self.path.display(), "Record written");
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, changes: Record) -> Result<bool> {
        self.modify(table, |t| {
            let found = t.merge(id, changes);
            (found, found)
        })
        .await
    }

    async fn delete(&self, table: &str, id: i64) -> Result<bool> {
        self.modify(table, |t| {
            let removed = t.remove(id);
            (removed, removed)
        })
        .await
    }
}
