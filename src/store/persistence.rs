//! Persistence layer for context records.

use crate::error::StoreError;
use crate::store::{ContextRecord, ContextStateStore};
use sled;
use std::path::Path;

/// Sled-based implementation of ContextStateStore.
///
/// Records are stored under their context name as JSON (property values
/// are shape-discriminated, which a self-describing encoding preserves).
pub struct SledContextStore {
    db: sled::Db,
}

impl SledContextStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| {
            StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Ok(Self { db })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(|e| {
            StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to flush database: {}", e),
            ))
        })?;
        Ok(())
    }
}

impl ContextStateStore for SledContextStore {
    fn get(&self, name: &str) -> Result<Option<ContextRecord>, StoreError> {
        match self.db.get(name.as_bytes()).map_err(|e| {
            StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to get context record: {}", e),
            ))
        })? {
            Some(value) => {
                let record: ContextRecord = serde_json::from_slice(&value).map_err(|e| {
                    StoreError::Encoding(format!("Failed to decode context record: {}", e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put(&self, record: &ContextRecord) -> Result<(), StoreError> {
        let value = serde_json::to_vec(record).map_err(|e| {
            StoreError::Encoding(format!("Failed to encode context record: {}", e))
        })?;
        self.db
            .insert(record.name.as_bytes(), value)
            .map_err(|e| {
                StoreError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to put context record: {}", e),
                ))
            })?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.db.remove(name.as_bytes()).map_err(|e| {
            StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to remove context record: {}", e),
            ))
        })?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<ContextRecord>, StoreError> {
        let mut records = Vec::new();
        for item in self.db.iter() {
            let (_, value) = item.map_err(|e| {
                StoreError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to iterate store: {}", e),
                ))
            })?;
            let record: ContextRecord = serde_json::from_slice(&value).map_err(|e| {
                StoreError::Encoding(format!("Failed to decode context record: {}", e))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
