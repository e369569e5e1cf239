//! Identity storage collaborators.
//!
//! The client owns no persistence; it goes through [`IdentityStore`].
//! Operations that modify the record are read-modify-write with no
//! compare-and-swap: the contract assumes a single writer. A
//! deployment with concurrent writers must serialize them around the
//! store (mutex, file lock, or optimistic versioning in its own
//! backend) — last writer wins otherwise.

use crate::error::{Result, WsaaError};
use crate::identity::IdentityRecord;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable storage for the identity record.
pub trait IdentityStore {
    /// Load the current record, or `None` if no identity has been
    /// provisioned yet.
    fn load(&self) -> Result<Option<IdentityRecord>>;

    /// Persist a record, replacing any previous one.
    fn save(&self, record: &IdentityRecord) -> Result<()>;
}

/// TOML-file-backed store.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<IdentityRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text =
            fs::read_to_string(&self.path).map_err(|e| WsaaError::Storage(Box::new(e)))?;
        let record = toml::from_str(&text).map_err(|e| WsaaError::Storage(Box::new(e)))?;
        Ok(Some(record))
    }

    fn save(&self, record: &IdentityRecord) -> Result<()> {
        let text =
            toml::to_string_pretty(record).map_err(|e| WsaaError::Storage(Box::new(e)))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| WsaaError::Storage(Box::new(e)))?;
            }
        }
        fs::write(&self.path, text).map_err(|e| WsaaError::Storage(Box::new(e)))
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemoryIdentityStore {
    record: Mutex<Option<IdentityRecord>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<IdentityRecord>> {
        let guard = self.record.lock().unwrap_or_else(|p| p.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, record: &IdentityRecord) -> Result<()> {
        let mut guard = self.record.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IdentityRecord {
        IdentityRecord::new("Acme".into(), "IT".into(), "20111111112".into())
            .with_keys("PUB".into(), "PRIV".into())
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("identity.toml"));

        assert_eq!(store.load().unwrap(), None);

        let record = record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record.clone()));

        let replacement = record.with_certificate("CERT".into());
        store.save(&replacement).unwrap();
        assert_eq!(store.load().unwrap(), Some(replacement));
    }

    #[test]
    fn test_file_store_rejects_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.toml");
        fs::write(&path, "this is not toml = = =").unwrap();

        let store = FileIdentityStore::new(path);
        assert!(matches!(store.load(), Err(WsaaError::Storage(_))));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryIdentityStore::new();
        assert_eq!(store.load().unwrap(), None);

        let record = record();
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }
}
