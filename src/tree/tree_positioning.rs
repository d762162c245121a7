//! Tree Positioning Operations
//!
//! Reordering inside a single list. Every commit replaces the whole list in
//! one assignment.

use crate::domain::{Context, DomainError, DomainResult, Entity, ItemId};

use super::ItemTree;

/// Insertion index for "immediately before `before`"; end of list when
/// `before` is absent or no longer present.
pub(crate) fn insertion_index<T: Entity<Id = ItemId>>(list: &[T], before: Option<&ItemId>) -> usize {
    before
        .and_then(|id| list.iter().position(|entry| entry.id() == id))
        .unwrap_or(list.len())
}

/// Permuted copy of `list` with `dragged` moved before `before`.
///
/// `None` when `dragged` is not in the list.
pub(crate) fn permute<T: Entity<Id = ItemId>>(list: &[T], dragged: &ItemId, before: Option<&ItemId>) -> Option<Vec<T>> {
    let from = list.iter().position(|entry| entry.id() == dragged)?;
    let mut next = list.to_vec();
    let moving = next.remove(from);
    let at = insertion_index(&next, before);
    next.insert(at, moving);
    Some(next)
}

impl ItemTree {
    /// Move `dragged` to just before `before` inside one context.
    ///
    /// Returns whether the list changed. Dropping an item onto itself leaves
    /// the list untouched. An unknown `before` appends.
    pub fn reorder_within_context(
        &mut self,
        context: &Context,
        dragged: &ItemId,
        before: Option<&ItemId>,
    ) -> DomainResult<bool> {
        if before == Some(dragged) {
            return Ok(false);
        }

        match context {
            Context::Root => {
                let next = permute(&self.items, dragged, before).ok_or_else(|| missing(dragged, context))?;
                if next == self.items {
                    return Ok(false);
                }
                self.items = next;
            }
            Context::Folder(folder_id) => {
                let folder = self
                    .folder_mut(folder_id)
                    .ok_or_else(|| DomainError::NotFound(format!("Folder {} not found", folder_id)))?;
                let next = permute(&folder.children, dragged, before).ok_or_else(|| missing(dragged, context))?;
                if next == folder.children {
                    return Ok(false);
                }
                folder.children = next;
            }
        }
        Ok(true)
    }
}

fn missing(id: &ItemId, context: &Context) -> DomainError {
    DomainError::NotFound(format!("Item {} not in {}", id, context))
}
