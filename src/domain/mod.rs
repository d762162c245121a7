//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies beyond serialization, ids and URL parsing.

mod context;
mod entity;
mod item;
mod link_url;

pub use context::{Context, ROOT_CONTEXT};
pub use entity::{DomainError, DomainResult, Entity};
pub use item::{Folder, Item, ItemId, ItemKind, Link};
pub use link_url::{bounded_title, host_title, link_title, normalize_url};
