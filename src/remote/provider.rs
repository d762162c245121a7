//! Bookmarks Provider
//!
//! The capability set consumed from an external bookmarks source, and the
//! node shape it speaks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{host_title, DomainResult, Folder, Item, ItemId, Link};

const FALLBACK_FOLDER_TITLE: &str = "Folder";

/// Bookmark node as the provider reports it; folders may nest arbitrarily
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteNode {
    Link {
        id: String,
        #[serde(default)]
        title: String,
        url: String,
    },
    Folder {
        id: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        children: Vec<RemoteNode>,
    },
}

impl RemoteNode {
    pub fn id(&self) -> &str {
        match self {
            RemoteNode::Link { id, .. } | RemoteNode::Folder { id, .. } => id,
        }
    }

    fn to_link(&self) -> Option<Link> {
        match self {
            RemoteNode::Link { id, title, url } => {
                let title = if title.trim().is_empty() {
                    host_title(url).unwrap_or_else(|| url.clone())
                } else {
                    title.clone()
                };
                Some(Link::with_id(ItemId::new(id.as_str()), title, url.as_str()))
            }
            RemoteNode::Folder { .. } => None,
        }
    }
}

/// Contents of the bookmarks toolbar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolbar {
    /// Toolbar folder id; absent when the provider has no toolbar
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub items: Vec<RemoteNode>,
}

impl Toolbar {
    pub fn root_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Toolbar contents as tree items.
    ///
    /// Remote ids are kept. Links inside sub-folders of a toolbar folder are
    /// hoisted into that folder, in document order.
    pub fn to_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .filter_map(|node| match node {
                RemoteNode::Link { .. } => node.to_link().map(Item::Link),
                RemoteNode::Folder { id, title, children } => {
                    let title = if title.trim().is_empty() { FALLBACK_FOLDER_TITLE } else { title.as_str() };
                    Some(Item::Folder(Folder::with_id(
                        ItemId::new(id.as_str()),
                        title,
                        hoist_links(children),
                    )))
                }
            })
            .collect()
    }
}

fn hoist_links(children: &[RemoteNode]) -> Vec<Link> {
    let mut links = Vec::new();
    let mut stack = vec![children.iter()];
    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some(node @ RemoteNode::Link { .. }) => links.extend(node.to_link()),
            Some(RemoteNode::Folder { children, .. }) => stack.push(children.iter()),
            None => {
                stack.pop();
            }
        }
    }
    links
}

/// Fields to change on a node; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// New parent and optional position for a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTarget {
    pub parent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// External bookmarks source. Every call may fail or never answer; callers
/// bound them with a timeout.
#[async_trait]
pub trait BookmarkProvider: Send + Sync {
    async fn get_toolbar(&self) -> DomainResult<Toolbar>;

    async fn create_link(&self, parent_id: &str, title: &str, url: &str, index: Option<usize>)
        -> DomainResult<RemoteNode>;

    async fn create_folder(&self, parent_id: &str, title: &str, index: Option<usize>) -> DomainResult<RemoteNode>;

    async fn update_node(&self, id: &str, changes: NodeChanges) -> DomainResult<RemoteNode>;

    async fn move_node(&self, id: &str, target: MoveTarget) -> DomainResult<RemoteNode>;

    /// Remove a node and everything under it
    async fn remove_node(&self, id: &str) -> DomainResult<()>;
}
