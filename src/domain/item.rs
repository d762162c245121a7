//! Item Entity
//!
//! A shortcut tile is either a Link or a Folder of Links. Folders hold
//! `Vec<Link>`, so a folder inside a folder cannot be represented.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::Entity;

/// Opaque item identifier.
///
/// Locally created ids look like `sc_<uuid>` / `fld_<uuid>`; ids handed out
/// by the bookmarks provider are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a newly created item of the given kind
    pub fn generate(kind: ItemKind) -> Self {
        Self(format!("{}_{}", kind.id_prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Discriminator of the two item variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Link,
    Folder,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Link => "link",
            ItemKind::Folder => "folder",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            ItemKind::Link => "sc",
            ItemKind::Folder => "fld",
        }
    }
}

/// A shortcut to a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: ItemId,
    pub title: String,
    /// Absolute, scheme-qualified URL
    pub url: String,
}

impl Link {
    /// Create a link with a freshly generated id
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_id(ItemId::generate(ItemKind::Link), title, url)
    }

    pub fn with_id(id: ItemId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A named group of links, one level deep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: ItemId,
    pub title: String,
    #[serde(default, with = "tagged_links")]
    pub children: Vec<Link>,
}

impl Folder {
    /// Create an empty folder with a freshly generated id
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(ItemId::generate(ItemKind::Folder), title, Vec::new())
    }

    pub fn with_id(id: ItemId, title: impl Into<String>, children: Vec<Link>) -> Self {
        Self {
            id,
            title: title.into(),
            children,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Tile in the shortcut grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Link(Link),
    Folder(Folder),
}

impl Item {
    pub fn id(&self) -> &ItemId {
        match self {
            Item::Link(link) => &link.id,
            Item::Folder(folder) => &folder.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Item::Link(link) => &link.title,
            Item::Folder(folder) => &folder.title,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Link(_) => ItemKind::Link,
            Item::Folder(_) => ItemKind::Folder,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Item::Folder(_))
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Item::Link(link) => Some(link),
            Item::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Item::Folder(folder) => Some(folder),
            Item::Link(_) => None,
        }
    }

    pub fn as_folder_mut(&mut self) -> Option<&mut Folder> {
        match self {
            Item::Folder(folder) => Some(folder),
            Item::Link(_) => None,
        }
    }
}

impl From<Link> for Item {
    fn from(link: Link) -> Self {
        Item::Link(link)
    }
}

impl From<Folder> for Item {
    fn from(folder: Folder) -> Self {
        Item::Folder(folder)
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        Item::id(self)
    }
}

impl Entity for Link {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Folder children are written with the same `"type": "link"` tag as
/// root entries so exported files read uniformly.
mod tagged_links {
    use super::Link;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum ChildRef<'a> {
        Link(&'a Link),
    }

    #[derive(Deserialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum Child {
        Link(Link),
    }

    pub fn serialize<S: Serializer>(links: &[Link], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(links.iter().map(ChildRef::Link))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Link>, D::Error> {
        let children = Vec::<Child>::deserialize(deserializer)?;
        Ok(children
            .into_iter()
            .map(|child| match child {
                Child::Link(link) => link,
            })
            .collect())
    }
}
