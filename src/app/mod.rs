//! Application State
//!
//! `ShortcutsApp` owns the tree, the page-lifetime UI flags, the active
//! store and, while synced, the bookmarks provider. Every entry point the
//! presentation layer calls lives here or in `commands`.

mod commands;

#[cfg(test)]
mod tests;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::domain::{Context, DomainError, DomainResult, Folder, Item, ItemId};
use crate::navigation::UiState;
use crate::remote::{self, BookmarkProvider, ChangeCoalescer, Toolbar};
use crate::repository::{export, ExportFile, RemoteStore, ShortcutStore};
use crate::timer;
use crate::tree::{ContextList, Found, ItemTree};

pub use commands::ImportMode;

/// Non-fatal condition the user should hear about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    SaveFailed { reason: String },
    RemoteFailed { reason: String },
    NothingToImport,
    ImportFailed { reason: String },
    ImportDisabled,
    SyncedWithBookmarks,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SaveFailed { .. } => write!(f, "Could not save shortcuts. Changes last until this page closes."),
            Notice::RemoteFailed { .. } => write!(f, "Bookmarks did not respond. The change was applied on this page only."),
            Notice::NothingToImport => write!(f, "No valid shortcuts found in the file."),
            Notice::ImportFailed { .. } => write!(f, "Could not read the file. Is it a shortcuts export?"),
            Notice::ImportDisabled => write!(f, "Import is unavailable while synced with bookmarks."),
            Notice::SyncedWithBookmarks => write!(f, "Synced with browser bookmarks."),
        }
    }
}

/// What the presentation layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View<'a> {
    pub items: &'a [Item],
    pub open_folder: Option<&'a Folder>,
    pub edit: bool,
    pub folder_edit: bool,
    pub synced: bool,
}

#[derive(Clone)]
struct RemoteLink {
    provider: Arc<dyn BookmarkProvider>,
    root_id: String,
}

impl RemoteLink {
    /// Provider parent id for a context
    fn parent_id(&self, context: &Context) -> String {
        match context {
            Context::Root => self.root_id.clone(),
            Context::Folder(id) => id.to_string(),
        }
    }
}

pub struct ShortcutsApp {
    tree: ItemTree,
    ui: UiState,
    store: Box<dyn ShortcutStore>,
    remote: Option<RemoteLink>,
    settings: Settings,
    notices: Vec<Notice>,
    changes: ChangeCoalescer,
}

impl ShortcutsApp {
    /// Start from whatever the store holds, or the default shortcuts
    pub async fn load(store: Box<dyn ShortcutStore>, settings: Settings) -> Self {
        let tree = match store.load().await.map(ItemTree::from_items) {
            Some(Ok(tree)) => tree,
            Some(Err(e)) => {
                warn!("stored shortcuts rejected, using defaults: {}", e);
                ItemTree::with_defaults()
            }
            None => {
                debug!("no stored shortcuts, using defaults");
                ItemTree::with_defaults()
            }
        };
        let changes = ChangeCoalescer::new(settings.change_debounce());
        Self {
            tree,
            ui: UiState::default(),
            store,
            remote: None,
            settings,
            notices: Vec::new(),
            changes,
        }
    }

    // ========================
    // Read side
    // ========================

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn find_by_id(&self, id: &ItemId) -> Option<Found<'_>> {
        self.tree.find_by_id(id)
    }

    pub fn list_for_context(&self, context: &Context) -> ContextList<'_> {
        self.tree.list_for_context(context)
    }

    /// True while the bookmarks provider is authoritative
    pub fn is_synced(&self) -> bool {
        self.remote.is_some()
    }

    /// Notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Close a vanished folder, then describe what to draw
    pub fn render(&mut self) -> View<'_> {
        self.ui.reconcile(&self.tree);
        View {
            items: self.tree.items(),
            open_folder: self.ui.nav.open_folder_id().and_then(|id| self.tree.folder(id)),
            edit: self.ui.edit,
            folder_edit: self.ui.folder_edit,
            synced: self.remote.is_some(),
        }
    }

    pub fn export(&self) -> DomainResult<ExportFile> {
        export(self.tree.items())
    }

    // ========================
    // Navigation
    // ========================

    /// Open a folder overlay. False when `id` is not a folder.
    pub fn open_folder(&mut self, id: &ItemId) -> bool {
        match self.ui.open_folder(&self.tree, id) {
            Ok(()) => true,
            Err(e) => {
                debug!("open folder ignored: {}", e);
                false
            }
        }
    }

    pub fn close_folder(&mut self) {
        self.ui.close_folder();
    }

    pub fn toggle_edit(&mut self) -> bool {
        self.ui.toggle_edit()
    }

    pub fn toggle_folder_edit(&mut self) -> bool {
        self.ui.toggle_folder_edit()
    }

    // ========================
    // Bookmarks sync
    // ========================

    /// Try the provider and, once it answers with a toolbar, hand it the data
    pub async fn connect_remote(&mut self, provider: Arc<dyn BookmarkProvider>) -> bool {
        match remote::connect(provider.as_ref(), &self.settings).await {
            Some(toolbar) => match self.attach_remote(provider, toolbar) {
                Ok(()) => true,
                Err(e) => {
                    warn!("bookmarks toolbar rejected, staying local: {}", e);
                    false
                }
            },
            None => {
                info!("bookmarks provider unavailable, staying local");
                false
            }
        }
    }

    /// Switch to the provider as the source of truth, mirroring `toolbar`
    pub fn attach_remote(&mut self, provider: Arc<dyn BookmarkProvider>, toolbar: Toolbar) -> DomainResult<()> {
        let root_id = toolbar
            .root_id()
            .ok_or_else(|| DomainError::InvalidInput("toolbar has no root id".to_string()))?
            .to_string();
        let tree = ItemTree::from_items(toolbar.to_items())?;

        info!("synced with bookmarks toolbar {}", root_id);
        self.tree = tree;
        self.store = Box::new(RemoteStore);
        self.remote = Some(RemoteLink { provider, root_id });
        self.ui.reconcile(&self.tree);
        self.notices.push(Notice::SyncedWithBookmarks);
        Ok(())
    }

    /// Replace the tree with the provider's current toolbar
    pub async fn refresh_from_remote(&mut self) {
        let Some(link) = self.remote.clone() else {
            return;
        };
        let fetched = self.bounded(link.provider.get_toolbar()).await;
        let tree = fetched.and_then(|toolbar| ItemTree::from_items(toolbar.to_items()));
        match tree {
            Ok(tree) => {
                self.tree = tree;
                self.ui.reconcile(&self.tree);
            }
            Err(e) => self.remote_failed(&e),
        }
    }

    /// A (coalesced) change broadcast arrived
    pub async fn handle_remote_change(&mut self) {
        if self.remote.is_some() {
            self.refresh_from_remote().await;
        }
    }

    /// A raw change broadcast arrived. Waits out the quiet period without
    /// holding the lock; only the last broadcast of a burst re-fetches.
    /// True when this call did the re-fetch.
    pub async fn handle_remote_change_debounced(app: &Mutex<ShortcutsApp>) -> bool {
        let changes = {
            let app = app.lock().await;
            if app.remote.is_none() {
                return false;
            }
            app.changes.clone()
        };
        let ticket = changes.notify();
        if !changes.settle(ticket).await {
            debug!("change {} superseded", ticket);
            return false;
        }
        app.lock().await.handle_remote_change().await;
        true
    }

    // ========================
    // Helpers
    // ========================

    /// Bound a provider call by the configured timeout
    async fn bounded<T>(&self, call: impl Future<Output = DomainResult<T>>) -> DomainResult<T> {
        match timer::timeout(self.settings.remote_call_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Remote("bookmarks call timed out".to_string())),
        }
    }

    fn remote_failed(&mut self, err: &DomainError) {
        warn!("bookmarks call failed, applying locally: {}", err);
        self.notices.push(Notice::RemoteFailed { reason: err.to_string() });
    }

    /// Save the whole tree and settle navigation after a local mutation
    async fn commit(&mut self) {
        if let Err(e) = self.store.save(self.tree.items()).await {
            warn!("saving shortcuts failed: {}", e);
            self.notices.push(Notice::SaveFailed { reason: e.to_string() });
        }
        self.ui.reconcile(&self.tree);
    }
}
