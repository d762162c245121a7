//! Item Tree
//!
//! The in-memory shortcut tree: an ordered root list of links and folders,
//! each folder holding an ordered list of links. All mutation goes through
//! the operations in this module so id uniqueness and one-level nesting hold
//! after every call.

mod tree_hierarchy;
mod tree_positioning;


use std::collections::HashSet;

use crate::domain::{Context, DomainError, DomainResult, Folder, Item, ItemId, ItemKind, Link};


/// Borrowed view of a tree node wherever it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef<'a> {
    Link(&'a Link),
    Folder(&'a Folder),
}

impl<'a> ItemRef<'a> {
    pub fn id(&self) -> &'a ItemId {
        match self {
            ItemRef::Link(link) => &link.id,
            ItemRef::Folder(folder) => &folder.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            ItemRef::Link(link) => &link.title,
            ItemRef::Folder(folder) => &folder.title,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Link(_) => ItemKind::Link,
            ItemRef::Folder(_) => ItemKind::Folder,
        }
    }

    pub fn as_link(&self) -> Option<&'a Link> {
        match self {
            ItemRef::Link(link) => Some(link),
            ItemRef::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&'a Folder> {
        match self {
            ItemRef::Folder(folder) => Some(folder),
            ItemRef::Link(_) => None,
        }
    }

    pub fn to_item(&self) -> Item {
        match self {
            ItemRef::Link(link) => Item::Link((*link).clone()),
            ItemRef::Folder(folder) => Item::Folder((*folder).clone()),
        }
    }
}

impl<'a> From<&'a Item> for ItemRef<'a> {
    fn from(item: &'a Item) -> Self {
        match item {
            Item::Link(link) => ItemRef::Link(link),
            Item::Folder(folder) => ItemRef::Folder(folder),
        }
    }
}

/// Result of `find_by_id`
#[derive(Debug, Clone, Copy)]
pub struct Found<'a> {
    pub item: ItemRef<'a>,
    /// Folder holding the item, `None` at root
    pub parent: Option<&'a Folder>,
    /// Position inside the containing list
    pub index: usize,
}

impl Found<'_> {
    /// Context of the list that contains the item
    pub fn context(&self) -> Context {
        match self.parent {
            Some(folder) => Context::Folder(folder.id.clone()),
            None => Context::Root,
        }
    }
}

/// Read-only view of the list a context addresses
#[derive(Debug, Clone, Copy)]
pub enum ContextList<'a> {
    Root(&'a [Item]),
    Folder(&'a [Link]),
    /// The folder no longer exists; reads as an empty list
    Missing,
}

impl<'a> ContextList<'a> {
    pub fn len(&self) -> usize {
        match self {
            ContextList::Root(items) => items.len(),
            ContextList::Folder(links) => links.len(),
            ContextList::Missing => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<ItemRef<'a>> {
        match self {
            ContextList::Root(items) => items.get(index).map(ItemRef::from),
            ContextList::Folder(links) => links.get(index).map(ItemRef::Link),
            ContextList::Missing => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemRef<'a>> + 'a {
        let list = *self;
        (0..list.len()).filter_map(move |i| list.get(i))
    }

    /// Index of `id` in this list
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.iter().position(|item| item.id() == id)
    }

    pub fn to_items(&self) -> Vec<Item> {
        self.iter().map(|item| item.to_item()).collect()
    }
}

/// The shortcut tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTree {
    items: Vec<Item>,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from stored or fetched items, rejecting duplicate ids
    pub fn from_items(items: Vec<Item>) -> DomainResult<Self> {
        let tree = Self { items };
        tree.check_unique_ids()?;
        Ok(tree)
    }

    /// Starter content shown before the user has saved anything
    pub fn with_defaults() -> Self {
        let work = Folder::with_id(
            ItemId::generate(ItemKind::Folder),
            "Work",
            vec![
                Link::new("Gmail", "https://mail.google.com"),
                Link::new("Drive", "https://drive.google.com"),
            ],
        );
        Self {
            items: vec![
                Item::Folder(work),
                Item::Link(Link::new("YouTube", "https://youtube.com")),
                Item::Link(Link::new("Maps", "https://maps.google.com")),
                Item::Link(Link::new("Translate", "https://translate.google.com")),
            ],
        }
    }

    /// Root list
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of links and folders, nested ones included
    pub fn len(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Item::Link(_) => 1,
                Item::Folder(folder) => 1 + folder.children.len(),
            })
            .sum()
    }

    /// Every id in walk order
    pub fn ids(&self) -> Vec<&ItemId> {
        let mut ids = Vec::with_capacity(self.len());
        for item in &self.items {
            ids.push(item.id());
            if let Item::Folder(folder) = item {
                ids.extend(folder.children.iter().map(|link| &link.id));
            }
        }
        ids
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Locate an item by id.
    ///
    /// Walks the root in order and, on each folder, its children before
    /// moving on. Only two levels exist, so the walk is a fixed pair of loops.
    pub fn find_by_id(&self, id: &ItemId) -> Option<Found<'_>> {
        for (index, item) in self.items.iter().enumerate() {
            if item.id() == id {
                return Some(Found {
                    item: ItemRef::from(item),
                    parent: None,
                    index,
                });
            }
            if let Item::Folder(folder) = item {
                if let Some(child_index) = folder.children.iter().position(|link| &link.id == id) {
                    return Some(Found {
                        item: ItemRef::Link(&folder.children[child_index]),
                        parent: Some(folder),
                        index: child_index,
                    });
                }
            }
        }
        None
    }

    /// Folder at root with the given id
    pub fn folder(&self, id: &ItemId) -> Option<&Folder> {
        self.items.iter().find_map(|item| match item {
            Item::Folder(folder) if &folder.id == id => Some(folder),
            _ => None,
        })
    }

    pub(crate) fn folder_mut(&mut self, id: &ItemId) -> Option<&mut Folder> {
        self.items.iter_mut().find_map(|item| match item {
            Item::Folder(folder) if &folder.id == id => Some(folder),
            _ => None,
        })
    }

    /// The list a context addresses; a vanished folder reads as empty
    pub fn list_for_context(&self, context: &Context) -> ContextList<'_> {
        match context {
            Context::Root => ContextList::Root(&self.items),
            Context::Folder(id) => match self.folder(id) {
                Some(folder) => ContextList::Folder(&folder.children),
                None => ContextList::Missing,
            },
        }
    }

    /// Rename a link or folder in place
    pub fn set_title(&mut self, id: &ItemId, title: &str) -> DomainResult<()> {
        for item in &mut self.items {
            match item {
                Item::Link(link) if &link.id == id => {
                    link.title = title.to_string();
                    return Ok(());
                }
                Item::Folder(folder) if &folder.id == id => {
                    folder.title = title.to_string();
                    return Ok(());
                }
                Item::Folder(folder) => {
                    if let Some(link) = folder.children.iter_mut().find(|link| &link.id == id) {
                        link.title = title.to_string();
                        return Ok(());
                    }
                }
                Item::Link(_) => {}
            }
        }
        Err(DomainError::NotFound(format!("Item {} not found", id)))
    }

    /// Replace title and url of a link in place
    pub fn update_link(&mut self, id: &ItemId, title: &str, url: &str) -> DomainResult<()> {
        let link = self
            .link_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Link {} not found", id)))?;
        link.title = title.to_string();
        link.url = url.to_string();
        Ok(())
    }

    fn link_mut(&mut self, id: &ItemId) -> Option<&mut Link> {
        for item in &mut self.items {
            match item {
                Item::Link(link) if &link.id == id => return Some(link),
                Item::Folder(folder) => {
                    if let Some(link) = folder.children.iter_mut().find(|link| &link.id == id) {
                        return Some(link);
                    }
                }
                Item::Link(_) => {}
            }
        }
        None
    }

    /// Duplicate ids make every other operation ambiguous
    pub fn check_unique_ids(&self) -> DomainResult<()> {
        let mut seen = HashSet::with_capacity(self.len());
        for id in self.ids() {
            if !seen.insert(id) {
                return Err(DomainError::Conflict(format!("Duplicate item id {}", id)));
            }
        }
        Ok(())
    }
}
