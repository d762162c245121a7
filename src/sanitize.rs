//! Import Sanitizer
//!
//! Turns arbitrary JSON into a clean item list. Never fails: anything that
//! does not look like a link or a folder is skipped.

use serde_json::Value;
use std::collections::HashSet;

use crate::config::ImportLimits;
use crate::domain::{bounded_title, link_title, normalize_url, Folder, Item, ItemId, ItemKind, Link};

/// Folder levels below a top-level folder that are still searched for links
const MAX_HOIST_DEPTH: usize = 32;

const FALLBACK_FOLDER_TITLE: &str = "Folder";

/// Sanitize with the default title / URL bounds
pub fn sanitize(input: &Value) -> Vec<Item> {
    sanitize_with(input, &ImportLimits::default())
}

/// Sanitize imported JSON.
///
/// Accepts a bare array or an object with an `items` array. Links need a
/// valid URL; folders survive only with at least one valid link, nested
/// folders are flattened into their top-level folder, and every kept entry
/// gets a fresh id.
pub fn sanitize_with(input: &Value, limits: &ImportLimits) -> Vec<Item> {
    let entries = match input {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(entries)) => entries,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let mut ids = IdAllocator::default();
    let mut out = Vec::new();
    for entry in entries {
        match entry_kind(entry) {
            Some(ItemKind::Link) => {
                if let Some(link) = sanitize_link(entry, limits, &mut ids) {
                    out.push(Item::Link(link));
                }
            }
            Some(ItemKind::Folder) => {
                let children = collect_links(entry, limits, &mut ids);
                if children.is_empty() {
                    continue;
                }
                let title = string_field(entry, "title")
                    .map(|t| bounded_title(t, limits.max_title_chars))
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| FALLBACK_FOLDER_TITLE.to_string());
                out.push(Item::Folder(Folder::with_id(ids.next(ItemKind::Folder), title, children)));
            }
            None => {}
        }
    }
    out
}

fn entry_kind(entry: &Value) -> Option<ItemKind> {
    match entry.as_object()?.get("type")?.as_str()? {
        "link" => Some(ItemKind::Link),
        "folder" => Some(ItemKind::Folder),
        _ => None,
    }
}

fn string_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

fn sanitize_link(entry: &Value, limits: &ImportLimits, ids: &mut IdAllocator) -> Option<Link> {
    let url = normalize_url(string_field(entry, "url")?, limits.max_url_chars)?;
    let title = link_title(string_field(entry, "title").unwrap_or(""), &url, limits.max_title_chars);
    Some(Link::with_id(ids.next(ItemKind::Link), title, url))
}

/// Valid links under a folder entry in document order, hoisting links out
/// of any nested folders.
fn collect_links(folder: &Value, limits: &ImportLimits, ids: &mut IdAllocator) -> Vec<Link> {
    let mut links = Vec::new();
    let Some(children) = folder.get("children").and_then(Value::as_array) else {
        return links;
    };

    let mut stack = vec![(children.iter(), 0usize)];
    loop {
        let Some((iter, depth)) = stack.last_mut() else {
            break;
        };
        let depth = *depth;
        let Some(entry) = iter.next() else {
            stack.pop();
            continue;
        };

        match entry_kind(entry) {
            Some(ItemKind::Link) => {
                if let Some(link) = sanitize_link(entry, limits, ids) {
                    links.push(link);
                }
            }
            Some(ItemKind::Folder) => {
                if depth >= MAX_HOIST_DEPTH {
                    log::warn!("import: folder nesting deeper than {} ignored", MAX_HOIST_DEPTH);
                    continue;
                }
                if let Some(nested) = entry.get("children").and_then(Value::as_array) {
                    stack.push((nested.iter(), depth + 1));
                }
            }
            None => {}
        }
    }
    links
}

/// Hands out fresh ids, never repeating one within an import
#[derive(Default)]
struct IdAllocator {
    seen: HashSet<ItemId>,
}

impl IdAllocator {
    fn next(&mut self, kind: ItemKind) -> ItemId {
        loop {
            let id = ItemId::generate(kind);
            if self.seen.insert(id.clone()) {
                return id;
            }
        }
    }
}
