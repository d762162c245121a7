//! Drop Resolution
//!
//! Turns a finished drag gesture into the tree operation it stands for.

use serde::{Deserialize, Serialize};

use crate::domain::{Context, ItemId};
use crate::tree::{ItemRef, ItemTree};

/// A drag gesture as the grid reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRequest {
    pub dragged: ItemId,
    /// Grid the drag started in
    pub from: Context,
    /// Grid the drop landed in
    pub to: Context,
    /// Tile under the pointer, `None` for empty grid space
    pub over: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPlan {
    /// Link dropped on a folder tile: append it to that folder
    IntoFolder(ItemId),
    /// Leave `from` for `to`, before `before` or at the end
    Move {
        from: Context,
        to: Context,
        before: Option<ItemId>,
    },
    /// Permute within one grid
    Reorder { context: Context, before: Option<ItemId> },
}

/// Resolve a drop against the current tree; `None` once the dragged item is gone
pub fn plan_drop(tree: &ItemTree, request: &DropRequest) -> Option<DropPlan> {
    let found = tree.find_by_id(&request.dragged)?;

    if let Some(over) = &request.over {
        let onto_folder = tree.folder(over).is_some();
        if onto_folder && matches!(found.item, ItemRef::Link(_)) {
            return Some(DropPlan::IntoFolder(over.clone()));
        }
    }

    let before = request.over.clone();
    if request.from != request.to {
        Some(DropPlan::Move {
            from: request.from.clone(),
            to: request.to.clone(),
            before,
        })
    } else {
        Some(DropPlan::Reorder {
            context: request.to.clone(),
            before,
        })
    }
}
