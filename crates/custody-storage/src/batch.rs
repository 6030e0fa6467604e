//! Atomic multi-key write sets.
//!
//! A [`WriteBatch`] collects puts across namespaces and is handed to
//! [`KvStore::commit`](crate::KvStore::commit), which applies all of them
//! or none. The contract uses it to land an evidence mutation and its
//! audit entry as one unit.

use custody_core::Namespace;

use crate::error::{StorageError, StorageResult};
use crate::kv::validate_key;

/// A single staged put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvWrite {
    /// Namespace the value is written to.
    pub namespace: Namespace,
    /// Key within the namespace.
    pub key: String,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

/// An ordered set of puts committed atomically.
///
/// Later puts to the same key win, matching sequential `set` semantics.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<KvWrite>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a raw put.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty or contains
    /// a null byte.
    pub fn put(
        &mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: Vec<u8>,
    ) -> StorageResult<()> {
        let key = key.into();
        validate_key(&key)?;
        self.writes.push(KvWrite {
            namespace,
            key,
            value,
        });
        Ok(())
    }

    /// Serialize a value as JSON and stage it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if serialization fails, or
    /// [`StorageError::InvalidKey`] for an invalid key.
    pub fn put_json<T: serde::Serialize>(
        &mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: &T,
    ) -> StorageResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.put(namespace, key, bytes)
    }

    /// Number of staged puts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Staged puts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KvWrite> {
        self.writes.iter()
    }

    /// Consume the batch, yielding its puts in insertion order.
    #[must_use]
    pub fn into_writes(self) -> Vec<KvWrite> {
        self.writes
    }
}
