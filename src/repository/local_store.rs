//! Local Store
//!
//! Persists the whole tree as one `{items}` JSON envelope under a single key.

use async_trait::async_trait;
use log::warn;

use crate::domain::{DomainResult, Item};
use crate::tree::ItemTree;

use super::snapshot::StoredEnvelope;
use super::traits::{KeyValueStore, ShortcutStore};

pub struct LocalStore<K: KeyValueStore> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> LocalStore<K> {
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        Self { kv, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Drop whatever is stored so the next load starts from defaults
    pub fn clear(&self) -> DomainResult<()> {
        self.kv.remove(&self.key)
    }
}

#[async_trait]
impl<K: KeyValueStore> ShortcutStore for LocalStore<K> {
    async fn load(&self) -> Option<Vec<Item>> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("local store read failed: {}", e);
                return None;
            }
        };

        let envelope: StoredEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("stored shortcuts are malformed, ignoring: {}", e);
                return None;
            }
        };

        match ItemTree::from_items(envelope.items) {
            Ok(tree) => Some(tree.into_items()),
            Err(e) => {
                warn!("stored shortcuts are inconsistent, ignoring: {}", e);
                None
            }
        }
    }

    async fn save(&self, items: &[Item]) -> DomainResult<()> {
        let envelope = StoredEnvelope { items: items.to_vec() };
        let raw = serde_json::to_string(&envelope)?;
        self.kv.set(&self.key, &raw)
    }
}
