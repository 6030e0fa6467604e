//! Plain key/value contract over the world-state namespace.
//!
//! Values are UTF-8 strings. No policy applies.

use std::sync::Arc;

use custody_core::Namespace;
use custody_storage::{KvStore, ScopedKvStore};
use tracing::debug;

use crate::error::{ContractError, ContractResult};

/// Create/update/read over arbitrary string keys.
#[derive(Debug, Clone)]
pub struct WorldStateContract {
    store: ScopedKvStore,
}

impl WorldStateContract {
    /// Create the contract over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store: ScopedKvStore::new(store, Namespace::WorldState),
        }
    }

    /// Store `value` under a new `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::AlreadyExists`] if `key` is taken.
    pub async fn create(&self, key: &str, value: &str) -> ContractResult<()> {
        if self.store.exists(key).await? {
            return Err(ContractError::already_exists(Namespace::WorldState, key));
        }
        self.store.set(key, value.as_bytes().to_vec()).await?;
        debug!(key, "world state entry created");
        Ok(())
    }

    /// Replace the value of an existing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::NotFound`] if `key` is absent.
    pub async fn update(&self, key: &str, value: &str) -> ContractResult<()> {
        if !self.store.exists(key).await? {
            return Err(ContractError::not_found(Namespace::WorldState, key));
        }
        self.store.set(key, value.as_bytes().to_vec()).await?;
        debug!(key, "world state entry updated");
        Ok(())
    }

    /// Read the value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::NotFound`] if `key` is absent, or
    /// [`ContractError::Corrupt`] if the value is not UTF-8.
    pub async fn read(&self, key: &str) -> ContractResult<String> {
        let bytes = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| ContractError::not_found(Namespace::WorldState, key))?;
        String::from_utf8(bytes).map_err(|e| ContractError::corrupt(Namespace::WorldState, key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_storage::MemoryKvStore;

    fn contract() -> WorldStateContract {
        WorldStateContract::new(Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let ws = contract();
        ws.create("greeting", "hello").await.unwrap();
        assert_eq!(ws.read("greeting").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let ws = contract();
        ws.create("k", "v1").await.unwrap();
        let err = ws.create("k", "v2").await.unwrap_err();
        assert!(matches!(err, ContractError::AlreadyExists { .. }));
        assert_eq!(ws.read("k").await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let ws = contract();
        let err = ws.update("k", "v").await.unwrap_err();
        assert!(matches!(err, ContractError::NotFound { .. }));

        ws.create("k", "v1").await.unwrap();
        ws.update("k", "v2").await.unwrap();
        assert_eq!(ws.read("k").await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_read_missing() {
        let err = contract().read("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "world state entry not found: nope");
    }
}
