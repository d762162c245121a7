//! Commands
//!
//! Mutating entry points. While synced, each goes to the bookmarks provider
//! first and the tree is re-fetched afterwards; if the call fails or times
//! out, that one operation is applied locally instead.

use std::future::Future;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{bounded_title, link_title, normalize_url, Context, DomainError, DomainResult, Folder, Item, ItemId, Link};
use crate::drop_plan::{plan_drop, DropPlan, DropRequest};
use crate::remote::{MoveTarget, NodeChanges};
use crate::repository::parse_import;

use super::{Notice, RemoteLink, ShortcutsApp};

const NEW_FOLDER_TITLE: &str = "New folder";
const FALLBACK_FOLDER_TITLE: &str = "Folder";

/// What an import does to the existing shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Imported items take the place of everything
    #[default]
    Replace,
    /// Imported items go after the existing ones
    Merge,
}

impl ShortcutsApp {
    /// Add a link at the end of `location`. An unknown folder falls back to root.
    pub async fn add_link(&mut self, title: &str, url: &str, location: &Context) -> DomainResult<()> {
        let limits = self.settings.limits();
        if url.trim().is_empty() {
            return Err(DomainError::InvalidInput("URL is required".to_string()));
        }
        let url = normalize_url(url, limits.max_url_chars)
            .ok_or_else(|| DomainError::InvalidInput(format!("Invalid URL: {}", url.trim())))?;
        let title = link_title(title, &url, limits.max_title_chars);
        let location = match location {
            Context::Folder(id) if self.tree.folder(id).is_none() => {
                debug!("folder {} gone, adding link at root", id);
                Context::Root
            }
            other => other.clone(),
        };

        let synced = self
            .via_remote(|link| {
                let (title, url, location) = (&title, &url, &location);
                async move {
                    let parent = link.parent_id(location);
                    link.provider.create_link(&parent, title, url, None).await
                }
            })
            .await;
        if synced {
            return Ok(());
        }

        self.tree.insert(&location, Item::Link(Link::new(title, url)), None)?;
        self.commit().await;
        Ok(())
    }

    /// Add a folder at the end of the root list
    pub async fn add_folder(&mut self, title: &str) -> DomainResult<()> {
        let title = folder_title(title, NEW_FOLDER_TITLE, self.settings.max_title_chars);

        let synced = self
            .via_remote(|link| {
                let title = &title;
                async move { link.provider.create_folder(&link.root_id, title, None).await }
            })
            .await;
        if synced {
            return Ok(());
        }

        self.tree.insert(&Context::Root, Item::Folder(Folder::new(title)), None)?;
        self.commit().await;
        Ok(())
    }

    /// Edit a link or folder.
    ///
    /// Folders take only the title. Links re-validate the URL (`None` keeps
    /// the current one) and, when `location` names another list, move to
    /// its end.
    pub async fn edit_item(
        &mut self,
        id: &ItemId,
        title: &str,
        url: Option<&str>,
        location: Option<&Context>,
    ) -> DomainResult<()> {
        let (current, current_url) = match self.tree.find_by_id(id) {
            Some(found) => (found.context(), found.item.as_link().map(|link| link.url.clone())),
            None => {
                debug!("edit of missing item {} ignored", id);
                return Ok(());
            }
        };

        let Some(current_url) = current_url else {
            return self.rename_folder(id, title).await;
        };

        let limits = self.settings.limits();
        let raw_url = url.unwrap_or(current_url.as_str());
        let url = normalize_url(raw_url, limits.max_url_chars)
            .ok_or_else(|| DomainError::InvalidInput(format!("Invalid URL: {}", raw_url.trim())))?;
        let title = link_title(title, &url, limits.max_title_chars);
        let target = location.cloned().unwrap_or_else(|| current.clone());
        if let Context::Folder(folder_id) = &target {
            if self.tree.folder(folder_id).is_none() {
                return Err(DomainError::InvalidInput(format!("Unknown location {}", folder_id)));
            }
        }
        let relocate = target != current;

        if self.remote.is_some() {
            // a failed move after a landed update is applied locally
            let updated = self.remote_update(id, &title, Some(&url)).await;
            if updated && (!relocate || self.remote_move(id, &target, None).await) {
                return Ok(());
            }
        }

        if relocate {
            match self.tree.move_across_context(id, &current, &target, None) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => debug!("edit move ignored: {}", e),
                Err(e) => return Err(e),
            }
        }
        match self.tree.update_link(id, &title, &url) {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!("edit ignored: {}", e),
            Err(e) => return Err(e),
        }
        self.commit().await;
        Ok(())
    }

    async fn rename_folder(&mut self, id: &ItemId, title: &str) -> DomainResult<()> {
        let title = folder_title(title, FALLBACK_FOLDER_TITLE, self.settings.max_title_chars);

        if self.remote_update(id, &title, None).await {
            return Ok(());
        }

        self.tree.set_title(id, &title)?;
        self.commit().await;
        Ok(())
    }

    /// Delete an item; a folder goes with its links
    pub async fn remove_item(&mut self, id: &ItemId) -> DomainResult<()> {
        if !self.tree.contains(id) {
            debug!("remove of missing item {} ignored", id);
            return Ok(());
        }

        let synced = self
            .via_remote(|link| async move { link.provider.remove_node(id.as_str()).await })
            .await;
        if synced {
            return Ok(());
        }

        self.tree.remove_by_id(id);
        self.commit().await;
        Ok(())
    }

    /// Move `dragged` before `before` inside one list
    pub async fn reorder(&mut self, context: &Context, dragged: &ItemId, before: Option<&ItemId>) -> DomainResult<()> {
        if before == Some(dragged) {
            debug!("drop of {} onto itself ignored", dragged);
            return Ok(());
        }
        if self.remote.is_some() && self.tree.list_for_context(context).position(dragged).is_none() {
            debug!("reorder ignored: item {} not in {}", dragged, context);
            return Ok(());
        }
        if self.remote_move(dragged, context, before).await {
            return Ok(());
        }

        match self.tree.reorder_within_context(context, dragged, before) {
            Ok(true) => self.commit().await,
            Ok(false) => {}
            Err(e) if e.is_not_found() => debug!("reorder ignored: {}", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Move `dragged` from one list to another, before `before` or at the end
    pub async fn move_item(
        &mut self,
        dragged: &ItemId,
        from: &Context,
        to: &Context,
        before: Option<&ItemId>,
    ) -> DomainResult<()> {
        if from == to {
            return self.reorder(to, dragged, before).await;
        }
        match self.tree.validate_move(dragged, from, to) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("move ignored: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if self.remote_move(dragged, to, before).await {
            return Ok(());
        }

        match self.tree.move_across_context(dragged, from, to, before) {
            Ok(()) => self.commit().await,
            Err(e) if e.is_not_found() => debug!("move ignored: {}", e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Carry out a finished drag gesture
    pub async fn drop_item(&mut self, request: &DropRequest) -> DomainResult<()> {
        let Some(plan) = plan_drop(&self.tree, request) else {
            debug!("drop of missing item {} ignored", request.dragged);
            return Ok(());
        };

        match plan {
            DropPlan::IntoFolder(folder_id) => {
                let into = Context::Folder(folder_id);
                // the item may have moved since the drag started
                let from = self
                    .tree
                    .find_by_id(&request.dragged)
                    .map(|found| found.context())
                    .unwrap_or_else(|| request.from.clone());
                self.move_item(&request.dragged, &from, &into, None).await
            }
            DropPlan::Move { from, to, before } => self.move_item(&request.dragged, &from, &to, before.as_ref()).await,
            DropPlan::Reorder { context, before } => self.reorder(&context, &request.dragged, before.as_ref()).await,
        }
    }

    /// Load shortcuts from an exported (or hand-written) JSON file.
    ///
    /// Returns how many top-level entries were imported. Problems surface as
    /// notices and leave the tree untouched.
    pub async fn import(&mut self, raw: &[u8], mode: ImportMode) -> DomainResult<usize> {
        if self.remote.is_some() {
            self.notices.push(Notice::ImportDisabled);
            return Ok(0);
        }

        let items = match parse_import(raw, &self.settings.limits()) {
            Ok(items) => items,
            Err(e) => {
                warn!("import failed: {}", e);
                self.notices.push(Notice::ImportFailed { reason: e.to_string() });
                return Ok(0);
            }
        };
        if items.is_empty() {
            self.notices.push(Notice::NothingToImport);
            return Ok(0);
        }

        let count = items.len();
        match mode {
            ImportMode::Replace => self.tree.replace_all(items)?,
            ImportMode::Merge => self.tree.extend(items)?,
        }
        info!("imported {} shortcuts ({:?})", count, mode);
        self.commit().await;
        Ok(count)
    }

    // ========================
    // Provider plumbing
    // ========================

    /// Run `call` against the provider when synced. True when it succeeded
    /// and the tree was re-fetched; false means apply the change locally.
    async fn via_remote<F, Fut, T>(&mut self, call: F) -> bool
    where
        F: FnOnce(RemoteLink) -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let Some(link) = self.remote.clone() else {
            return false;
        };
        match self.bounded(call(link)).await {
            Ok(_) => {
                self.refresh_from_remote().await;
                true
            }
            Err(e) => {
                self.remote_failed(&e);
                false
            }
        }
    }

    /// Provider update of a node's title and, for links, url
    async fn remote_update(&mut self, id: &ItemId, title: &str, url: Option<&str>) -> bool {
        self.via_remote(|link| {
            let changes = NodeChanges {
                title: Some(title.to_string()),
                url: url.map(str::to_string),
            };
            async move { link.provider.update_node(id.as_str(), changes).await }
        })
        .await
    }

    /// Provider move into `to`. The index is the hovered tile's position
    /// (0 if it vanished); no index appends.
    async fn remote_move(&mut self, dragged: &ItemId, to: &Context, before: Option<&ItemId>) -> bool {
        let index = before.map(|id| self.tree.list_for_context(to).position(id).unwrap_or(0));
        self.via_remote(|link| async move {
            let target = MoveTarget {
                parent_id: link.parent_id(to),
                index,
            };
            link.provider.move_node(dragged.as_str(), target).await
        })
        .await
    }
}

fn folder_title(raw: &str, fallback: &str, max_chars: usize) -> String {
    let title = bounded_title(raw, max_chars);
    if title.is_empty() {
        fallback.to_string()
    } else {
        title
    }
}
