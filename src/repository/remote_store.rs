//! Remote Store
//!
//! Persistence while the bookmarks provider is authoritative: nothing is
//! read from or written to local storage.

use async_trait::async_trait;

use crate::domain::{DomainResult, Item};

use super::traits::ShortcutStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteStore;

#[async_trait]
impl ShortcutStore for RemoteStore {
    async fn load(&self) -> Option<Vec<Item>> {
        None
    }

    async fn save(&self, _items: &[Item]) -> DomainResult<()> {
        Ok(())
    }

    fn is_remote(&self) -> bool {
        true
    }
}
