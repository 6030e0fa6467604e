//! Raw key-value store trait and implementations.
//!
//! The [`KvStore`] trait provides byte-level operations scoped to a typed
//! [`Namespace`]. Implementations:
//!
//! - **In-memory** (always available): For tests and ephemeral ledgers
//! - **`SurrealKV`** (behind `kv` feature): Persistent, versioned, ACID-compliant
//!
//! # Consistency
//!
//! Each call observes a consistent snapshot and [`KvStore::commit`] applies
//! a [`WriteBatch`] atomically. Nothing more is promised: a `get` followed
//! by a `set` is two independent calls, and callers must treat every call
//! as fallible.
//!
//! # Ergonomic Access
//!
//! Use [`ScopedKvStore`] to pre-bind a namespace. It also provides typed
//! [`get_json`](ScopedKvStore::get_json) / [`set_json`](ScopedKvStore::set_json)
//! convenience methods.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use custody_core::Namespace;

use crate::batch::WriteBatch;
use crate::error::{StorageError, StorageResult};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a key is safe for storage.
///
/// Keys must be non-empty and must not contain the null byte (used
/// internally as the namespace/key separator).
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".into()));
    }
    if key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "key must not contain null bytes".into(),
        ));
    }
    Ok(())
}

/// Build the composite key `"{namespace}\0{key}"` as bytes.
#[cfg(feature = "kv")]
fn composite_key(namespace: Namespace, key: &str) -> Vec<u8> {
    let ns = namespace.as_str();
    let mut buf = Vec::with_capacity(ns.len().saturating_add(1).saturating_add(key.len()));
    buf.extend_from_slice(ns.as_bytes());
    buf.push(0);
    buf.extend_from_slice(key.as_bytes());
    buf
}

/// Build the start of the namespace range (inclusive): `"{namespace}\0"`.
#[cfg(feature = "kv")]
fn namespace_range_start(namespace: Namespace) -> Vec<u8> {
    let ns = namespace.as_str();
    let mut buf = Vec::with_capacity(ns.len().saturating_add(1));
    buf.extend_from_slice(ns.as_bytes());
    buf.push(0);
    buf
}

/// Build the end of the namespace range (exclusive): `"{namespace}\x01"`.
///
/// Since `\0` is the separator, any key in the namespace has the form
/// `"{namespace}\0{key}"`. The byte `\x01` immediately follows `\0`,
/// so the range `["{namespace}\0", "{namespace}\x01")` captures exactly
/// all keys in the namespace.
#[cfg(feature = "kv")]
fn namespace_range_end(namespace: Namespace) -> Vec<u8> {
    let ns = namespace.as_str();
    let mut buf = Vec::with_capacity(ns.len().saturating_add(1));
    buf.extend_from_slice(ns.as_bytes());
    buf.push(1);
    buf
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A key-value entry with its namespace and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    /// The namespace this entry belongs to.
    pub namespace: Namespace,
    /// The key within the namespace.
    pub key: String,
    /// The raw value bytes.
    pub value: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Raw key-value store trait.
///
/// Provides namespaced byte-level storage. All operations are scoped
/// to a namespace for isolation.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a value by namespace and key.
    ///
    /// Returns `None` if the key does not exist.
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Set a value for a namespace and key.
    ///
    /// Overwrites any existing value.
    async fn set(&self, namespace: Namespace, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Check if a key exists in a namespace.
    async fn exists(&self, namespace: Namespace, key: &str) -> StorageResult<bool>;

    /// Read every entry of a namespace, ordered by key.
    async fn scan(&self, namespace: Namespace) -> StorageResult<Vec<KvEntry>>;

    /// Apply all puts of a batch atomically.
    ///
    /// Either every put becomes visible or none does.
    async fn commit(&self, batch: WriteBatch) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (always available)
// ---------------------------------------------------------------------------

/// In-memory key-value store for tests and ephemeral ledgers.
///
/// Each namespace is a `BTreeMap`, so scans come back in key order.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: std::sync::RwLock<HashMap<Namespace, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryKvStore {
    /// Create a new empty in-memory KV store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(&namespace).and_then(|ns| ns.get(key)).cloned())
    }

    async fn set(&self, namespace: Namespace, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        data.entry(namespace)
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }

    async fn exists(&self, namespace: Namespace, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data.get(&namespace).is_some_and(|ns| ns.contains_key(key)))
    }

    async fn scan(&self, namespace: Namespace) -> StorageResult<Vec<KvEntry>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(data
            .get(&namespace)
            .map(|ns| {
                ns.iter()
                    .map(|(key, value)| KvEntry {
                        namespace,
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        tracing::trace!(writes = batch.len(), "committing batch to memory store");
        // One write guard for the whole batch: readers see all puts or none.
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        for write in batch.into_writes() {
            data.entry(write.namespace)
                .or_default()
                .insert(write.key, write.value);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SurrealKV implementation (behind `kv` feature)
// ---------------------------------------------------------------------------

/// Persistent key-value store backed by `SurrealKV`.
///
/// ACID-compliant, versioned, embedded LSM-tree storage.
/// All operations use transactions internally.
///
/// # Example
///
/// ```rust,ignore
/// use custody_storage::SurrealKvStore;
/// use custody_core::Namespace;
///
/// let store = SurrealKvStore::open("./data/ledger")?;
/// store.set(Namespace::WorldState, "greeting", b"hello".to_vec()).await?;
/// ```
#[cfg(feature = "kv")]
pub struct SurrealKvStore {
    tree: surrealkv::Tree,
}

#[cfg(feature = "kv")]
impl std::fmt::Debug for SurrealKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealKvStore").finish_non_exhaustive()
    }
}

#[cfg(feature = "kv")]
impl SurrealKvStore {
    /// Open a persistent KV store at the given directory path.
    ///
    /// Creates the directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the store cannot be opened.
    pub fn open(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let tree = surrealkv::TreeBuilder::new()
            .with_path(path.to_path_buf())
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        tracing::debug!(path = %path.display(), "opened SurrealKV ledger store");
        Ok(Self { tree })
    }

    /// Close the store, flushing any pending writes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the flush fails.
    pub async fn close(&self) -> StorageResult<()> {
        self.tree
            .close()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }
}

#[cfg(feature = "kv")]
fn map_kv_err(e: &surrealkv::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[cfg(feature = "kv")]
#[async_trait]
impl KvStore for SurrealKvStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let ck = composite_key(namespace, key);
        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        tx.get(&ck).map_err(|ref e| map_kv_err(e))
    }

    async fn set(&self, namespace: Namespace, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        let ck = composite_key(namespace, key);
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        tx.set(&ck, &value).map_err(|ref e| map_kv_err(e))?;
        tx.commit().await.map_err(|ref e| map_kv_err(e))
    }

    async fn exists(&self, namespace: Namespace, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let ck = composite_key(namespace, key);
        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;
        Ok(tx.get(&ck).map_err(|ref e| map_kv_err(e))?.is_some())
    }

    async fn scan(&self, namespace: Namespace) -> StorageResult<Vec<KvEntry>> {
        let start = namespace_range_start(namespace);
        let end = namespace_range_end(namespace);
        let prefix_len = namespace.as_str().len().saturating_add(1); // namespace + \0

        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(|ref e| map_kv_err(e))?;

        // Collect keys first, then read values (iterator borrows tx).
        let keys = {
            let mut iter = tx.range(&start, &end).map_err(|ref e| map_kv_err(e))?;
            iter.seek_first().map_err(|ref e| map_kv_err(e))?;
            let mut keys = Vec::new();
            while iter.valid() {
                let raw_key = iter.key();
                if raw_key.len() > prefix_len
                    && let Ok(key_str) = std::str::from_utf8(&raw_key[prefix_len..])
                {
                    keys.push(key_str.to_string());
                }
                iter.next().map_err(|ref e| map_kv_err(e))?;
            }
            keys
        };

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let ck = composite_key(namespace, &key);
            if let Some(value) = tx.get(&ck).map_err(|ref e| map_kv_err(e))? {
                entries.push(KvEntry {
                    namespace,
                    key,
                    value,
                });
            }
        }
        Ok(entries)
    }

    async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        tracing::trace!(writes = batch.len(), "committing batch to SurrealKV");
        let mut tx = self.tree.begin().map_err(|ref e| map_kv_err(e))?;
        for write in batch.iter() {
            let ck = composite_key(write.namespace, &write.key);
            tx.set(&ck, &write.value).map_err(|ref e| map_kv_err(e))?;
        }
        tx.commit().await.map_err(|ref e| map_kv_err(e))
    }
}

// ---------------------------------------------------------------------------
// Scoped store (namespace pre-bound)
// ---------------------------------------------------------------------------

/// A namespace-scoped view into a [`KvStore`].
///
/// Each ledger component holds one of these for its own record kind and
/// never names a namespace directly.
///
/// # Example
///
/// ```rust,ignore
/// use custody_storage::{ScopedKvStore, MemoryKvStore};
/// use custody_core::Namespace;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryKvStore::new());
/// let evidence = ScopedKvStore::new(store, Namespace::Evidence);
///
/// evidence.set("EV1", b"{}".to_vec()).await?;
/// let val = evidence.get("EV1").await?;
/// ```
#[derive(Clone)]
pub struct ScopedKvStore {
    inner: Arc<dyn KvStore>,
    namespace: Namespace,
}

impl std::fmt::Debug for ScopedKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedKvStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl ScopedKvStore {
    /// Create a scoped view into the given store for `namespace`.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, namespace: Namespace) -> Self {
        Self {
            inner: store,
            namespace,
        }
    }

    /// The namespace this store is scoped to.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The underlying unscoped store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.inner
    }

    /// Get a raw byte value by key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty or invalid.
    pub async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        self.inner.get(self.namespace, key).await
    }

    /// Set a raw byte value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty or invalid.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        self.inner.set(self.namespace, key, value).await
    }

    /// Check if a key exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty or invalid.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        self.inner.exists(self.namespace, key).await
    }

    /// Read every entry in this namespace, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store operation fails.
    pub async fn scan(&self) -> StorageResult<Vec<KvEntry>> {
        self.inner.scan(self.namespace).await
    }

    /// Commit a batch through the underlying store.
    ///
    /// The batch may touch any namespace, not just this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying commit fails.
    pub async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        self.inner.commit(batch).await
    }

    // -- Typed convenience (JSON) --

    /// Deserialize a JSON value from the store.
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if deserialization fails.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let bytes = self.get(key).await?;
        bytes
            .map(|b| {
                serde_json::from_slice(&b).map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .transpose()
    }

    /// Serialize a value as JSON and store it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if serialization fails.
    pub async fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set(key, bytes).await
    }

    /// Serialize a value as JSON and stage it into `batch` under this namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if serialization fails, or
    /// [`StorageError::InvalidKey`] for an invalid key.
    pub fn stage_json<T: serde::Serialize>(
        &self,
        batch: &mut WriteBatch,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        batch.put_json(self.namespace, key, value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
