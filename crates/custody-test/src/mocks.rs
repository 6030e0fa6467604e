//! Mock implementations for testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use custody_core::Namespace;
use custody_storage::{
    KvEntry, KvStore, MemoryKvStore, StorageError, StorageResult, WriteBatch,
};

/// A [`KvStore`] over [`MemoryKvStore`] whose reads, writes and commits can
/// be made to fail on demand.
///
/// Switches are atomics, so a shared `Arc<FailingKvStore>` can be flipped
/// while the system under test holds it.
#[derive(Debug, Default)]
pub struct FailingKvStore {
    inner: MemoryKvStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_commits: AtomicBool,
    commits: AtomicUsize,
}

impl FailingKvStore {
    /// A healthy store; nothing fails until a switch is flipped.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `get`, `exists` and `scan` fail.
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    /// Make `set` fail.
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    /// Make `commit` fail without applying any put.
    pub fn fail_commits(&self, on: bool) {
        self.fail_commits.store(on, Ordering::SeqCst);
    }

    /// Number of successful commits.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Write raw bytes past every switch, e.g. to plant a corrupt record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid.
    pub async fn plant(&self, namespace: Namespace, key: &str, value: &[u8]) -> StorageResult<()> {
        self.inner.set(namespace, key, value.to_vec()).await
    }

    fn check(flag: &AtomicBool, op: &str) -> StorageResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Internal(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for FailingKvStore {
    async fn get(&self, namespace: Namespace, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get(namespace, key).await
    }

    async fn set(&self, namespace: Namespace, key: &str, value: Vec<u8>) -> StorageResult<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.set(namespace, key, value).await
    }

    async fn exists(&self, namespace: Namespace, key: &str) -> StorageResult<bool> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.exists(namespace, key).await
    }

    async fn scan(&self, namespace: Namespace) -> StorageResult<Vec<KvEntry>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.scan(namespace).await
    }

    async fn commit(&self, batch: WriteBatch) -> StorageResult<()> {
        Self::check(&self.fail_commits, "commit")?;
        self.inner.commit(batch).await?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
