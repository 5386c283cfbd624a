//! # Record Persistence
//!
//! [`RecordStore`] is the persistence seam the services depend on.
//! [`MemoryStore`] keeps records in a map; [`JsonDirStore`] keeps one
//! pretty-printed JSON document per record (`record-<id>.json`) in a
//! directory and assigns identifiers as one past the largest on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::record::FileRecord;

/// Persistence for file records.
pub trait RecordStore {
    /// Store a new record, assign its identifier, and return it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be written.
    fn add_file_record(&mut self, record: &mut FileRecord) -> Result<u64, StoreError>;

    /// Overwrite a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unsaved`] if the record has no identifier and
    /// [`StoreError::NotFound`] if nothing is stored under it.
    fn update_file_record(&mut self, record: &FileRecord) -> Result<(), StoreError>;

    /// Fetch a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if nothing is stored under `id`.
    fn get_file_record(&self, id: u64) -> Result<FileRecord, StoreError>;

    /// All records in identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a stored record cannot be read.
    fn list_file_records(&self) -> Result<Vec<FileRecord>, StoreError>;
}

// ─── In-memory ──────────────────────────────────────────────────────

/// Records held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<u64, FileRecord>,
    next_id: u64,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn add_file_record(&mut self, record: &mut FileRecord) -> Result<u64, StoreError> {
        self.next_id += 1;
        let id = self.next_id;
        record.id = Some(id);
        self.records.insert(id, record.clone());
        Ok(id)
    }

    fn update_file_record(&mut self, record: &FileRecord) -> Result<(), StoreError> {
        let id = record.id.ok_or(StoreError::Unsaved)?;
        let slot = self.records.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        *slot = record.clone();
        Ok(())
    }

    fn get_file_record(&self, id: u64) -> Result<FileRecord, StoreError> {
        self.records.get(&id).cloned().ok_or(StoreError::NotFound { id })
    }

    fn list_file_records(&self) -> Result<Vec<FileRecord>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }
}

// ─── JSON directory ─────────────────────────────────────────────────

const RECORD_PREFIX: &str = "record-";
const RECORD_SUFFIX: &str = ".json";

/// One JSON document per record in a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "opened record store");
        Ok(Self { dir })
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{RECORD_PREFIX}{id}{RECORD_SUFFIX}"))
    }

    fn ids(&self) -> Result<Vec<u64>, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;
        let mut ids: Vec<u64> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_prefix(RECORD_PREFIX)?
                    .strip_suffix(RECORD_SUFFIX)?
                    .parse()
                    .ok()
            })
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn write(&self, record: &FileRecord, id: u64) -> Result<(), StoreError> {
        let path = self.path_for(id);
        let body = serde_json::to_string_pretty(record).map_err(|e| StoreError::Serialization {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        // Readers never observe a partially written record.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|source| StoreError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl RecordStore for JsonDirStore {
    fn add_file_record(&mut self, record: &mut FileRecord) -> Result<u64, StoreError> {
        let id = self.ids()?.last().copied().unwrap_or(0) + 1;
        record.id = Some(id);
        self.write(record, id)?;
        tracing::info!(id, path = %self.path_for(id).display(), "stored file record");
        Ok(id)
    }

    fn update_file_record(&mut self, record: &FileRecord) -> Result<(), StoreError> {
        let id = record.id.ok_or(StoreError::Unsaved)?;
        if !self.path_for(id).exists() {
            return Err(StoreError::NotFound { id });
        }
        self.write(record, id)
    }

    fn get_file_record(&self, id: u64) -> Result<FileRecord, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound { id });
        }
        let text = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| StoreError::Serialization {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn list_file_records(&self) -> Result<Vec<FileRecord>, StoreError> {
        self.ids()?
            .into_iter()
            .map(|id| self.get_file_record(id))
            .collect()
    }
}
