//! Client-side key/value storage
//!
//! Values are plain strings under a fixed set of names. Two backends:
//! `MemoryStore` for tests and one-shot runs, `JsonFileStore` for state that
//! must survive between CLI invocations.

use crate::error::StoreError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Names of persisted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    /// Payment created but not yet confirmed
    CurrentPaymentId,
    /// `"true"` while a grant is active
    PremiumAccess,
    /// Status reported when the grant was recorded
    PremiumStatus,
    /// Payment the grant came from
    PremiumPaymentId,
    /// Matrix key the grant is bound to
    PremiumMatrixKey,
    /// RFC 3339 time the grant was recorded
    PremiumAccessDate,
    /// JSON form data saved before redirecting to the payment page
    PaymentCalcData,
    /// Page to come back to after payment
    PaymentReturnUrl,
    /// Matrix key the pending payment is for
    PaymentMatrixKeyPending,
}

impl StorageKey {
    /// Every key, in declaration order
    pub const ALL: [StorageKey; 9] = [
        Self::CurrentPaymentId,
        Self::PremiumAccess,
        Self::PremiumStatus,
        Self::PremiumPaymentId,
        Self::PremiumMatrixKey,
        Self::PremiumAccessDate,
        Self::PaymentCalcData,
        Self::PaymentReturnUrl,
        Self::PaymentMatrixKeyPending,
    ];

    /// Persisted name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentPaymentId => "currentPaymentId",
            Self::PremiumAccess => "premiumAccess",
            Self::PremiumStatus => "premiumStatus",
            Self::PremiumPaymentId => "premiumPaymentId",
            Self::PremiumMatrixKey => "premiumMatrixKey",
            Self::PremiumAccessDate => "premiumAccessDate",
            Self::PaymentCalcData => "paymentCalcData",
            Self::PaymentReturnUrl => "paymentReturnUrl",
            Self::PaymentMatrixKeyPending => "paymentMatrixKeyPending",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key/value store
pub trait ClientStore {
    /// Read a value
    fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError>;

    /// Write a value
    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StoreError>;

    /// Delete a value; missing keys are not an error
    fn remove(&mut self, key: StorageKey) -> Result<(), StoreError>;

    /// Delete several values
    fn remove_all(&mut self, keys: &[StorageKey]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(*key)?;
        }
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<StorageKey, String>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ClientStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(&key).cloned())
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StoreError> {
        self.values.remove(&key);
        Ok(())
    }
}

/// Store backed by a JSON object file
///
/// The whole map is rewritten on every change, through a sibling temp file
/// renamed over the target. Unknown names in the file are preserved.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open a store, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => decode_values(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = values.len(), "opened client store");
        Ok(Self { path, values })
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, &self.values)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Parse a storage file; every value must be a string
fn decode_values(text: &str) -> Result<BTreeMap<String, String>, StoreError> {
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;
    raw.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            other => Err(StoreError::InvalidValue {
                reason: format!("expected a string, found {other}"),
                key,
            }),
        })
        .collect()
}

impl ClientStore for JsonFileStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key.as_str()).cloned())
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.as_str().to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StoreError> {
        if self.values.remove(key.as_str()).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        store.set(StorageKey::PremiumAccess, "true").unwrap();
        assert_eq!(
            store.get(StorageKey::PremiumAccess).unwrap().as_deref(),
            Some("true")
        );
        store.remove(StorageKey::PremiumAccess).unwrap();
        assert!(store.is_empty());
        store.remove(StorageKey::PremiumAccess).unwrap();
    }

    #[test]
    fn file_store_persists_between_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(StorageKey::CurrentPaymentId, "pay-1").unwrap();
        store.set(StorageKey::PremiumMatrixKey, "personal|1990-05-15|Anna").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(StorageKey::CurrentPaymentId).unwrap().as_deref(),
            Some("pay-1")
        );

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"premiumMatrixKey\""));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn file_store_keeps_unknown_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(StorageKey::PremiumAccess, "true").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"theme\""));
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Format(_))
        ));
    }

    #[test]
    fn file_store_rejects_non_string_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"premiumAccess": true}"#).unwrap();

        match JsonFileStore::open(&path) {
            Err(StoreError::InvalidValue { key, reason }) => {
                assert_eq!(key, "premiumAccess");
                assert!(reason.contains("true"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested/state.json")).unwrap();
        assert_eq!(store.get(StorageKey::PremiumAccess).unwrap(), None);
    }
}
