//! Context
//!
//! The list an operation addresses: the root grid or one folder's children.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::item::ItemId;

/// Wire value used for the root list
pub const ROOT_CONTEXT: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Context {
    #[default]
    Root,
    Folder(ItemId),
}

impl Context {
    pub fn folder(id: impl Into<ItemId>) -> Self {
        Context::Folder(id.into())
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Context::Root)
    }

    pub fn folder_id(&self) -> Option<&ItemId> {
        match self {
            Context::Root => None,
            Context::Folder(id) => Some(id),
        }
    }

    /// Parse the presentation layer's string form (`"root"` or a folder id)
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == ROOT_CONTEXT {
            Context::Root
        } else {
            Context::Folder(ItemId::new(raw))
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Root => f.write_str(ROOT_CONTEXT),
            Context::Folder(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for Context {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Context::parse(&raw))
    }
}
