//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for persistence.
//! Implementations can use browser storage, files, memory, or defer to the
//! bookmarks provider.

use async_trait::async_trait;

use crate::domain::{DomainResult, Item};

/// Plain string key-value storage (get / set / remove, no transactions)
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Overwrite the value under `key`; quota failures surface as `DomainError::Storage`
    fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    fn remove(&self, key: &str) -> DomainResult<()>;
}

/// Where the shortcut tree is persisted between page loads
#[async_trait]
pub trait ShortcutStore: Send + Sync {
    /// Stored items, or `None` when nothing usable is stored (caller seeds defaults)
    async fn load(&self) -> Option<Vec<Item>>;

    /// Overwrite stored state with the full tree
    async fn save(&self, items: &[Item]) -> DomainResult<()>;

    /// True when a remote provider owns the data and local writes are skipped
    fn is_remote(&self) -> bool {
        false
    }
}
