//! Folder Navigation
//!
//! Which folder overlay is open, plus the two edit-mode toggles. Lives for
//! the page session only and is never persisted.

use crate::domain::{DomainError, DomainResult, ItemId};
use crate::tree::ItemTree;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FolderNav {
    #[default]
    Closed,
    Open(ItemId),
}

impl FolderNav {
    pub fn open_folder_id(&self) -> Option<&ItemId> {
        match self {
            FolderNav::Closed => None,
            FolderNav::Open(id) => Some(id),
        }
    }
}

/// Page-lifetime UI state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub nav: FolderNav,
    /// Root grid shows drag handles and action buttons
    pub edit: bool,
    /// Folder overlay shows drag handles and action buttons
    pub folder_edit: bool,
}

impl UiState {
    /// Open a folder, replacing whichever one was open
    pub fn open_folder(&mut self, tree: &ItemTree, id: &ItemId) -> DomainResult<()> {
        if tree.folder(id).is_none() {
            return Err(DomainError::NotFound(format!("Folder {} not found", id)));
        }
        self.nav = FolderNav::Open(id.clone());
        self.folder_edit = false;
        Ok(())
    }

    pub fn close_folder(&mut self) {
        self.nav = FolderNav::Closed;
        self.folder_edit = false;
    }

    pub fn toggle_edit(&mut self) -> bool {
        self.edit = !self.edit;
        self.edit
    }

    pub fn toggle_folder_edit(&mut self) -> bool {
        self.folder_edit = !self.folder_edit;
        self.folder_edit
    }

    /// Close the overlay if its folder no longer exists. Returns whether it closed.
    pub fn reconcile(&mut self, tree: &ItemTree) -> bool {
        let stale = match &self.nav {
            FolderNav::Open(id) => tree.folder(id).is_none(),
            FolderNav::Closed => false,
        };
        if stale {
            log::debug!("open folder vanished, closing overlay");
            self.close_folder();
        }
        stale
    }
}
