//! Tree Hierarchy Operations
//!
//! Insert, remove and move items between the root list and folders.

use std::collections::HashSet;

use crate::domain::{Context, DomainError, DomainResult, Item, ItemId, Link};

use super::tree_positioning::insertion_index;
use super::ItemTree;

impl ItemTree {
    /// Detach an item from whatever list holds it and hand it back
    pub fn remove_by_id(&mut self, id: &ItemId) -> Option<Item> {
        let found = self.find_by_id(id)?;
        let index = found.index;
        match found.parent.map(|folder| folder.id.clone()) {
            None => Some(self.items.remove(index)),
            Some(folder_id) => {
                let folder = self.folder_mut(&folder_id)?;
                Some(Item::Link(folder.children.remove(index)))
            }
        }
    }

    /// Insert a new item into `context` before `before` (or at the end).
    ///
    /// Fails on an id already in the tree, a folder targeted at a folder, or
    /// a destination folder that does not exist. Returns the index used.
    pub fn insert(&mut self, context: &Context, item: Item, before: Option<&ItemId>) -> DomainResult<usize> {
        if self.contains(item.id()) {
            return Err(DomainError::Conflict(format!("Item {} already exists", item.id())));
        }
        self.insert_into(context, item, before).map_err(|(e, _)| e)
    }

    /// Insert without the uniqueness check; gives the item back on failure
    /// so a caller mid-move can restore it.
    fn insert_into(
        &mut self,
        context: &Context,
        item: Item,
        before: Option<&ItemId>,
    ) -> Result<usize, (DomainError, Item)> {
        match context {
            Context::Root => {
                let at = insertion_index(&self.items, before);
                self.items.insert(at, item);
                Ok(at)
            }
            Context::Folder(folder_id) => {
                let link = match item {
                    Item::Link(link) => link,
                    Item::Folder(folder) => {
                        let err = nesting_error(&folder.id, folder_id);
                        return Err((err, Item::Folder(folder)));
                    }
                };
                match self.folder_mut(folder_id) {
                    Some(folder) => {
                        let at = insertion_index(&folder.children, before);
                        folder.children.insert(at, link);
                        Ok(at)
                    }
                    None => Err((
                        DomainError::NotFound(format!("Folder {} not found", folder_id)),
                        Item::Link(link),
                    )),
                }
            }
        }
    }

    /// Replace the list a context addresses wholesale.
    ///
    /// The new list may only contain ids that are not used outside the
    /// replaced list, and a folder list may only contain links.
    pub fn set_list_for_context(&mut self, context: &Context, list: Vec<Item>) -> DomainResult<()> {
        let mut seen = HashSet::with_capacity(list.len());
        for item in &list {
            if !seen.insert(item.id().clone()) {
                return Err(DomainError::Conflict(format!("Duplicate item id {}", item.id())));
            }
            if let Item::Folder(folder) = item {
                for child in &folder.children {
                    if !seen.insert(child.id.clone()) {
                        return Err(DomainError::Conflict(format!("Duplicate item id {}", child.id)));
                    }
                }
            }
        }

        let outside: HashSet<&ItemId> = match context {
            Context::Root => HashSet::new(),
            Context::Folder(folder_id) => {
                let current: HashSet<&ItemId> = self
                    .folder(folder_id)
                    .map(|folder| folder.children.iter().map(|link| &link.id).collect())
                    .unwrap_or_default();
                self.ids().into_iter().filter(|id| !current.contains(id)).collect()
            }
        };
        if let Some(clash) = seen.iter().find(|id| outside.contains(id)) {
            return Err(DomainError::Conflict(format!("Item {} already exists elsewhere", clash)));
        }

        match context {
            Context::Root => {
                self.items = list;
            }
            Context::Folder(folder_id) => {
                let mut links: Vec<Link> = Vec::with_capacity(list.len());
                for item in list {
                    match item {
                        Item::Link(link) => links.push(link),
                        Item::Folder(folder) => return Err(nesting_error(&folder.id, folder_id)),
                    }
                }
                let folder = self
                    .folder_mut(folder_id)
                    .ok_or_else(|| DomainError::NotFound(format!("Folder {} not found", folder_id)))?;
                folder.children = links;
            }
        }
        Ok(())
    }

    /// Check that `dragged` sits in `from` and may land in `to`.
    ///
    /// NotFound for a stale item or destination folder, InvalidOperation for
    /// a folder headed into a folder. Nothing is changed.
    pub fn validate_move(&self, dragged: &ItemId, from: &Context, to: &Context) -> DomainResult<()> {
        let found = self
            .find_by_id(dragged)
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", dragged)))?;
        if &found.context() != from {
            return Err(DomainError::NotFound(format!("Item {} not in {}", dragged, from)));
        }
        if let (Some(_), Context::Folder(folder_id)) = (found.item.as_folder(), to) {
            return Err(nesting_error(dragged, folder_id));
        }
        if let Context::Folder(folder_id) = to {
            if self.folder(folder_id).is_none() {
                return Err(DomainError::NotFound(format!("Folder {} not found", folder_id)));
            }
        }
        Ok(())
    }

    /// Move `dragged` out of `from` and into `to`, before `before`.
    ///
    /// Folders only move within the root. The tree is unchanged on any error;
    /// an unknown `before` appends instead of failing.
    pub fn move_across_context(
        &mut self,
        dragged: &ItemId,
        from: &Context,
        to: &Context,
        before: Option<&ItemId>,
    ) -> DomainResult<()> {
        if from == to {
            return self.reorder_within_context(to, dragged, before).map(|_| ());
        }

        self.validate_move(dragged, from, to)?;
        let original_index = self
            .find_by_id(dragged)
            .map(|found| found.index)
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", dragged)))?;

        let moving = self
            .remove_by_id(dragged)
            .ok_or_else(|| DomainError::Internal(format!("Item {} vanished mid-move", dragged)))?;
        match self.insert_into(to, moving, before) {
            Ok(_) => Ok(()),
            Err((err, moving)) => {
                self.restore(from, original_index, moving)?;
                Err(err)
            }
        }
    }

    /// Put an item back exactly where it was taken from
    fn restore(&mut self, context: &Context, index: usize, item: Item) -> DomainResult<()> {
        match (context, item) {
            (Context::Root, item) => {
                let at = index.min(self.items.len());
                self.items.insert(at, item);
                Ok(())
            }
            (Context::Folder(folder_id), Item::Link(link)) => {
                let folder = self
                    .folder_mut(folder_id)
                    .ok_or_else(|| DomainError::Internal(format!("Folder {} vanished mid-move", folder_id)))?;
                let at = index.min(folder.children.len());
                folder.children.insert(at, link);
                Ok(())
            }
            (Context::Folder(folder_id), Item::Folder(folder)) => Err(nesting_error(&folder.id, folder_id)),
        }
    }

    /// Replace the whole root list
    pub fn replace_all(&mut self, items: Vec<Item>) -> DomainResult<()> {
        *self = ItemTree::from_items(items)?;
        Ok(())
    }

    /// Append items after the existing root entries
    pub fn extend(&mut self, items: Vec<Item>) -> DomainResult<()> {
        let mut merged = self.items.clone();
        merged.extend(items);
        self.replace_all(merged)
    }
}

fn nesting_error(folder: &ItemId, target: &ItemId) -> DomainError {
    DomainError::InvalidOperation(format!("Folder {} cannot be placed inside folder {}", folder, target))
}
