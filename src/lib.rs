//! New-Tab Shortcuts
//!
//! Layered architecture:
//! - domain: Items, contexts and URL rules
//! - tree: The in-memory shortcut tree and its operations
//! - repository: Key-value backends, local / remote stores, import and export
//! - remote: Bookmarks provider capability, message bridge and connection
//! - app: Application state and the entry points the page calls

pub mod app;
pub mod config;
pub mod domain;
pub mod drop_plan;
pub mod navigation;
pub mod remote;
pub mod repository;
pub mod sanitize;
pub mod tree;

mod timer;

pub use app::{ImportMode, Notice, ShortcutsApp, View};
pub use config::{ImportLimits, Settings};
pub use domain::{Context, DomainError, DomainResult, Folder, Item, ItemId, Link};
pub use drop_plan::{plan_drop, DropPlan, DropRequest};
pub use navigation::{FolderNav, UiState};
pub use tree::ItemTree;
