//! Application Tests
//!
//! Entry points end to end: local persistence, notices, navigation and the
//! bookmarks-synced path against an in-memory provider.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::app::{ImportMode, Notice, ShortcutsApp};
use crate::config::Settings;
use crate::domain::{Context, DomainError, ItemId};
use crate::drop_plan::DropRequest;
use crate::navigation::FolderNav;
use crate::remote::tests::FakeProvider;
use crate::remote::RemoteNode;
use crate::repository::{FileKv, LocalStore, MemoryKv, ShortcutStore};

fn memory_store() -> Box<dyn ShortcutStore> {
    Box::new(LocalStore::new(MemoryKv::new(), "shortcuts.v1"))
}

async fn setup_app() -> ShortcutsApp {
    ShortcutsApp::load(memory_store(), Settings::default()).await
}

/// App seeded with a single link titled "github"
async fn setup_github_app() -> ShortcutsApp {
    let mut app = setup_app().await;
    app.import(br#"[{"type":"link","title":"github","url":"https://github.com"}]"#, ImportMode::Replace)
        .await
        .expect("Import failed");
    app
}

fn id_of(app: &ShortcutsApp, title: &str) -> ItemId {
    app.tree()
        .items()
        .iter()
        .flat_map(|item| {
            let mut pairs = vec![(item.title().to_string(), item.id().clone())];
            if let Some(folder) = item.as_folder() {
                pairs.extend(folder.children.iter().map(|l| (l.title.clone(), l.id.clone())));
            }
            pairs
        })
        .find(|(t, _)| t == title)
        .map(|(_, id)| id)
        .unwrap_or_else(|| panic!("no item titled {}", title))
}

fn root_titles(app: &ShortcutsApp) -> Vec<String> {
    app.tree().items().iter().map(|i| i.title().to_string()).collect()
}

fn remote_link(id: &str, title: &str) -> RemoteNode {
    RemoteNode::Link {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("https://{}.example.com", title),
    }
}

async fn setup_synced_app() -> (ShortcutsApp, FakeProvider) {
    let provider = FakeProvider::with_items(
        "1",
        vec![
            remote_link("10", "alpha"),
            RemoteNode::Folder {
                id: "20".into(),
                title: "Dev".into(),
                children: vec![remote_link("21", "docs")],
            },
            remote_link("30", "beta"),
        ],
    );
    let mut app = setup_app().await;
    assert!(app.connect_remote(Arc::new(provider.clone())).await);
    (app, provider)
}

// ========================
// Load / persistence
// ========================

#[tokio::test]
async fn test_load_seeds_defaults() {
    let app = setup_app().await;
    assert_eq!(root_titles(&app), vec!["Work", "YouTube", "Maps", "Translate"]);
    assert!(!app.is_synced());
}

#[tokio::test]
async fn test_changes_survive_reload() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let open = || -> Box<dyn ShortcutStore> { Box::new(LocalStore::new(FileKv::new(dir.path()), "shortcuts.v1")) };

    let mut app = ShortcutsApp::load(open(), Settings::default()).await;
    app.add_link("Docs", "docs.rs", &Context::Root).await.unwrap();

    let reloaded = ShortcutsApp::load(open(), Settings::default()).await;
    assert_eq!(reloaded.tree(), app.tree());
    assert!(root_titles(&reloaded).contains(&"Docs".to_string()));
}

#[tokio::test]
async fn test_save_failure_keeps_session_state() {
    let store: Box<dyn ShortcutStore> = Box::new(LocalStore::new(MemoryKv::with_quota(32), "shortcuts.v1"));
    let mut app = ShortcutsApp::load(store, Settings::default()).await;

    app.add_link("Rust", "rust-lang.org", &Context::Root).await.unwrap();

    assert!(root_titles(&app).contains(&"Rust".to_string()));
    let notices = app.take_notices();
    assert!(matches!(notices.as_slice(), [Notice::SaveFailed { .. }]));
    assert!(app.take_notices().is_empty());
}

// ========================
// Add / edit / remove
// ========================

#[tokio::test]
async fn test_add_link_coerces_and_titles_from_host() {
    let mut app = setup_app().await;
    app.add_link("  ", "www.example.com", &Context::Root).await.unwrap();

    let last = app.tree().items().last().unwrap().as_link().unwrap().clone();
    assert_eq!(last.url, "https://www.example.com");
    assert_eq!(last.title, "example.com");
    assert!(last.id.as_str().starts_with("sc_"));
}

#[tokio::test]
async fn test_add_link_validation_leaves_tree_untouched() {
    let mut app = setup_app().await;
    let before = app.tree().clone();

    let err = app.add_link("x", "   ", &Context::Root).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    let err = app.add_link("x", "http://", &Context::Root).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    assert_eq!(app.tree(), &before);
}

#[tokio::test]
async fn test_add_link_into_folder_and_unknown_location() {
    let mut app = setup_app().await;
    let work = id_of(&app, "Work");

    app.add_link("Calendar", "calendar.google.com", &Context::Folder(work.clone()))
        .await
        .unwrap();
    let folder = app.tree().folder(&work).unwrap();
    assert_eq!(folder.children.last().map(|l| l.title.as_str()), Some("Calendar"));

    app.add_link("Lost", "lost.example.com", &Context::folder("fld_gone")).await.unwrap();
    assert_eq!(root_titles(&app).last().map(String::as_str), Some("Lost"));
}

#[tokio::test]
async fn test_add_folder_defaults_title() {
    let mut app = setup_app().await;
    app.add_folder("").await.unwrap();
    let last = app.tree().items().last().unwrap();
    assert!(last.is_folder());
    assert_eq!(last.title(), "New folder");
    assert_eq!(last.as_folder().unwrap().child_count(), 0);
}

#[tokio::test]
async fn test_edit_folder_and_link() {
    let mut app = setup_app().await;
    let work = id_of(&app, "Work");
    let maps = id_of(&app, "Maps");

    app.edit_item(&work, "   ", None, None).await.unwrap();
    assert_eq!(app.tree().folder(&work).unwrap().title, "Folder");

    app.edit_item(&maps, "Map", Some("openstreetmap.org"), Some(&Context::Folder(work.clone())))
        .await
        .unwrap();
    let folder = app.tree().folder(&work).unwrap();
    let moved = folder.children.last().unwrap();
    assert_eq!(moved.id, maps);
    assert_eq!(moved.title, "Map");
    assert_eq!(moved.url, "https://openstreetmap.org");
    assert!(!root_titles(&app).contains(&"Map".to_string()));
}

#[tokio::test]
async fn test_edit_rejects_bad_url_and_unknown_location() {
    let mut app = setup_app().await;
    let maps = id_of(&app, "Maps");
    let before = app.tree().clone();

    let err = app.edit_item(&maps, "Maps", Some("https://"), None).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    let err = app
        .edit_item(&maps, "Maps", None, Some(&Context::folder("fld_gone")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    assert_eq!(app.tree(), &before);
}

#[tokio::test]
async fn test_missing_ids_are_silent_no_ops() {
    let mut app = setup_app().await;
    let before = app.tree().clone();
    let ghost = ItemId::new("sc_ghost");

    app.remove_item(&ghost).await.unwrap();
    app.edit_item(&ghost, "x", None, None).await.unwrap();
    app.reorder(&Context::Root, &ghost, None).await.unwrap();
    app.move_item(&ghost, &Context::Root, &Context::folder("x"), None).await.unwrap();

    assert_eq!(app.tree(), &before);
    assert!(app.take_notices().is_empty());
}

// ========================
// Navigation
// ========================

#[tokio::test]
async fn test_removing_open_folder_closes_overlay() {
    let mut app = setup_app().await;
    let work = id_of(&app, "Work");

    assert!(app.open_folder(&work));
    assert!(app.toggle_folder_edit());
    assert_eq!(app.render().open_folder.map(|f| f.id.clone()), Some(work.clone()));

    app.remove_item(&work).await.unwrap();
    let view = app.render();
    assert!(view.open_folder.is_none());
    assert!(!view.folder_edit);
    assert_eq!(app.ui().nav, FolderNav::Closed);
}

#[tokio::test]
async fn test_open_folder_rejects_links() {
    let mut app = setup_app().await;
    let maps = id_of(&app, "Maps");
    assert!(!app.open_folder(&maps));
    assert!(app.toggle_edit());
    let view = app.render();
    assert!(view.edit);
    assert!(view.open_folder.is_none());
}

// ========================
// Reorder / move / drop
// ========================

#[tokio::test]
async fn test_add_folder_then_move_link_into_it() {
    let mut app = setup_github_app().await;
    app.add_folder("Work").await.unwrap();
    assert_eq!(root_titles(&app), vec!["github", "Work"]);

    let github = id_of(&app, "github");
    let work = id_of(&app, "Work");
    app.move_item(&github, &Context::Root, &Context::Folder(work.clone()), None)
        .await
        .unwrap();

    assert_eq!(root_titles(&app), vec!["Work"]);
    let folder = app.tree().folder(&work).unwrap();
    assert_eq!(folder.children.len(), 1);
    assert_eq!(folder.children[0].url, "https://github.com");
}

#[tokio::test]
async fn test_reorder_root() {
    let mut app = setup_app().await;
    let translate = id_of(&app, "Translate");
    let youtube = id_of(&app, "YouTube");
    app.reorder(&Context::Root, &translate, Some(&youtube)).await.unwrap();
    assert_eq!(root_titles(&app), vec!["Work", "Translate", "YouTube", "Maps"]);
}

#[tokio::test]
async fn test_drop_link_onto_folder_tile() {
    let mut app = setup_app().await;
    let work = id_of(&app, "Work");
    let maps = id_of(&app, "Maps");

    app.drop_item(&DropRequest {
        dragged: maps.clone(),
        from: Context::Root,
        to: Context::Root,
        over: Some(work.clone()),
    })
    .await
    .unwrap();

    let folder = app.tree().folder(&work).unwrap();
    assert_eq!(folder.children.last().map(|l| l.id.clone()), Some(maps));
}

#[tokio::test]
async fn test_drop_out_of_folder_before_tile() {
    let mut app = setup_app().await;
    let work = id_of(&app, "Work");
    let drive = id_of(&app, "Drive");
    let maps = id_of(&app, "Maps");

    app.drop_item(&DropRequest {
        dragged: drive,
        from: Context::Folder(work.clone()),
        to: Context::Root,
        over: Some(maps),
    })
    .await
    .unwrap();

    assert_eq!(root_titles(&app), vec!["Work", "YouTube", "Drive", "Maps", "Translate"]);
    assert_eq!(app.tree().folder(&work).unwrap().children.len(), 1);
}

#[tokio::test]
async fn test_drop_folder_into_folder_grid_rejected() {
    let mut app = setup_app().await;
    app.add_folder("Other").await.unwrap();
    let work = id_of(&app, "Work");
    let other = id_of(&app, "Other");
    let before = app.tree().clone();

    let err = app
        .drop_item(&DropRequest {
            dragged: other,
            from: Context::Root,
            to: Context::Folder(work),
            over: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert_eq!(app.tree(), &before);
}

// ========================
// Import / export
// ========================

#[tokio::test]
async fn test_import_replace_and_merge() {
    let mut app = setup_app().await;
    let file = br#"{"items":[{"type":"folder","title":"X","children":[{"type":"link","title":"","url":"example.com"}]}]}"#;

    assert_eq!(app.import(file, ImportMode::Merge).await.unwrap(), 1);
    assert_eq!(root_titles(&app), vec!["Work", "YouTube", "Maps", "Translate", "X"]);

    assert_eq!(app.import(file, ImportMode::Replace).await.unwrap(), 1);
    assert_eq!(root_titles(&app), vec!["X"]);
    let folder = app.tree().items()[0].as_folder().unwrap();
    assert_eq!(folder.children[0].url, "https://example.com");
    assert_eq!(folder.children[0].title, "example.com");
    assert!(app.tree().check_unique_ids().is_ok());
}

#[tokio::test]
async fn test_import_problems_become_notices() {
    let mut app = setup_app().await;
    let before = app.tree().clone();

    assert_eq!(app.import(b"not json", ImportMode::Replace).await.unwrap(), 0);
    assert_eq!(app.import(br#"{"items":[{"type":"widget"}]}"#, ImportMode::Replace).await.unwrap(), 0);

    let notices = app.take_notices();
    assert!(matches!(notices[0], Notice::ImportFailed { .. }));
    assert_eq!(notices[1], Notice::NothingToImport);
    assert_eq!(app.tree(), &before);
}

#[tokio::test]
async fn test_export_then_import_is_isomorphic() {
    let app = setup_app().await;
    let file = app.export().unwrap();
    assert!(file.file_name.starts_with("shortcuts-"));

    let mut other = setup_github_app().await;
    other.import(file.contents.as_bytes(), ImportMode::Replace).await.unwrap();

    let shape = |a: &ShortcutsApp| -> Vec<(String, Vec<(String, String)>)> {
        a.tree()
            .items()
            .iter()
            .map(|item| {
                let children = item
                    .as_folder()
                    .map(|f| f.children.iter().map(|l| (l.title.clone(), l.url.clone())).collect())
                    .unwrap_or_default();
                (item.title().to_string(), children)
            })
            .collect()
    };
    assert_eq!(shape(&other), shape(&app));
}

// ========================
// Bookmarks sync
// ========================

#[tokio::test]
async fn test_connect_mirrors_toolbar() {
    let (mut app, _provider) = setup_synced_app().await;
    assert!(app.is_synced());
    assert_eq!(root_titles(&app), vec!["alpha", "Dev", "beta"]);
    assert_eq!(app.take_notices(), vec![Notice::SyncedWithBookmarks]);
    assert!(app.render().synced);
}

#[tokio::test]
async fn test_synced_add_goes_through_provider() {
    let (mut app, provider) = setup_synced_app().await;

    app.add_link("", "gamma.example.com", &Context::Root).await.unwrap();
    app.add_link("inner", "inner.example.com", &Context::folder("20")).await.unwrap();

    assert_eq!(provider.calls(), vec!["createLink", "createLink"]);
    assert_eq!(root_titles(&app), vec!["alpha", "Dev", "beta", "gamma.example.com"]);
    let dev = app.tree().folder(&ItemId::new("20")).unwrap();
    assert_eq!(dev.children.last().map(|l| l.title.as_str()), Some("inner"));
    // ids come from the provider
    assert!(app.tree().items()[3].id().as_str().parse::<u64>().is_ok());
}

#[tokio::test]
async fn test_synced_drop_uses_hovered_index() {
    let (mut app, provider) = setup_synced_app().await;

    app.drop_item(&DropRequest {
        dragged: ItemId::new("30"),
        from: Context::Root,
        to: Context::Root,
        over: Some(ItemId::new("10")),
    })
    .await
    .unwrap();
    assert_eq!(root_titles(&app), vec!["beta", "alpha", "Dev"]);

    app.drop_item(&DropRequest {
        dragged: ItemId::new("10"),
        from: Context::Root,
        to: Context::Root,
        over: Some(ItemId::new("20")),
    })
    .await
    .unwrap();
    let dev = app.tree().folder(&ItemId::new("20")).unwrap();
    assert_eq!(dev.children.last().map(|l| l.id.as_str()), Some("10"));
    assert_eq!(provider.calls(), vec!["moveNode", "moveNode"]);
}

#[tokio::test]
async fn test_synced_folder_into_folder_rejected_before_provider() {
    let (mut app, provider) = setup_synced_app().await;
    app.add_folder("Other").await.unwrap();
    let other = id_of(&app, "Other");

    let err = app
        .move_item(&other, &Context::Root, &Context::Folder(ItemId::new("20")), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert_eq!(provider.calls(), vec!["createFolder"]);
    assert_eq!(root_titles(&app), vec!["alpha", "Dev", "beta", "Other"]);

    // the drag gesture path goes through the same check
    let err = app
        .drop_item(&DropRequest {
            dragged: other.clone(),
            from: Context::Root,
            to: Context::Folder(ItemId::new("20")),
            over: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert_eq!(provider.calls(), vec!["createFolder"]);
}

#[tokio::test]
async fn test_synced_self_drop_makes_no_call() {
    let (mut app, provider) = setup_synced_app().await;
    let toolbar_calls = provider.toolbar_calls();

    app.reorder(&Context::Root, &ItemId::new("10"), Some(&ItemId::new("10")))
        .await
        .unwrap();
    app.reorder(&Context::Root, &ItemId::new("21"), None).await.unwrap();

    assert!(provider.calls().is_empty());
    assert_eq!(provider.toolbar_calls(), toolbar_calls);
    assert_eq!(root_titles(&app), vec!["alpha", "Dev", "beta"]);
}

#[tokio::test]
async fn test_synced_edit_keeps_update_when_move_fails() {
    let (mut app, provider) = setup_synced_app().await;
    app.take_notices();
    provider.fail_method("moveNode");

    app.edit_item(&ItemId::new("10"), "Alpha two", None, Some(&Context::Folder(ItemId::new("20"))))
        .await
        .unwrap();

    assert_eq!(provider.calls(), vec!["updateNode", "moveNode"]);
    assert!(matches!(
        provider.items().first(),
        Some(RemoteNode::Link { id, title, .. }) if id == "10" && title == "Alpha two"
    ));
    assert!(matches!(app.take_notices().as_slice(), [Notice::RemoteFailed { .. }]));

    assert_eq!(root_titles(&app), vec!["Dev", "beta"]);
    let dev = app.tree().folder(&ItemId::new("20")).unwrap();
    let moved = dev.children.last().unwrap();
    assert_eq!(moved.id.as_str(), "10");
    assert_eq!(moved.title, "Alpha two");
    assert_eq!(moved.url, "https://alpha.example.com");
}

#[tokio::test]
async fn test_synced_edit_falls_back_whole_when_update_fails() {
    let (mut app, provider) = setup_synced_app().await;
    app.take_notices();
    provider.fail_method("updateNode");

    app.edit_item(&ItemId::new("10"), "Alpha two", None, Some(&Context::Folder(ItemId::new("20"))))
        .await
        .unwrap();

    // the move is not attempted once the update failed
    assert_eq!(provider.calls(), vec!["updateNode"]);
    assert!(matches!(app.take_notices().as_slice(), [Notice::RemoteFailed { .. }]));
    let dev = app.tree().folder(&ItemId::new("20")).unwrap();
    assert_eq!(dev.children.last().map(|l| l.title.as_str()), Some("Alpha two"));
}

#[tokio::test]
async fn test_synced_failure_falls_back_locally() {
    let (mut app, provider) = setup_synced_app().await;
    app.take_notices();

    provider.fail_next(1);
    app.remove_item(&ItemId::new("10")).await.unwrap();

    assert_eq!(root_titles(&app), vec!["Dev", "beta"]);
    assert!(matches!(app.take_notices().as_slice(), [Notice::RemoteFailed { .. }]));
    // the provider still has it; the next change broadcast restores the mirror
    assert_eq!(provider.items().len(), 3);
    app.handle_remote_change().await;
    assert_eq!(root_titles(&app), vec!["alpha", "Dev", "beta"]);
}

#[tokio::test(start_paused = true)]
async fn test_synced_timeout_falls_back_locally() {
    let (mut app, provider) = setup_synced_app().await;
    app.take_notices();

    provider.hang(true);
    app.add_folder("Offline").await.unwrap();

    assert_eq!(root_titles(&app).last().map(String::as_str), Some("Offline"));
    assert!(matches!(app.take_notices().as_slice(), [Notice::RemoteFailed { .. }]));
}

#[tokio::test]
async fn test_synced_import_disabled() {
    let (mut app, _provider) = setup_synced_app().await;
    app.take_notices();
    let before = app.tree().clone();

    let imported = app
        .import(br#"[{"type":"link","url":"example.com"}]"#, ImportMode::Merge)
        .await
        .unwrap();
    assert_eq!(imported, 0);
    assert_eq!(app.take_notices(), vec![Notice::ImportDisabled]);
    assert_eq!(app.tree(), &before);
}

#[tokio::test]
async fn test_remote_change_refetches_and_closes_stale_folder() {
    let (mut app, provider) = setup_synced_app().await;
    assert!(app.open_folder(&ItemId::new("20")));

    provider.push_external(remote_link("40", "delta"));
    app.handle_remote_change().await;
    assert_eq!(root_titles(&app), vec!["alpha", "Dev", "beta", "delta"]);

    app.edit_item(&ItemId::new("20"), "Development", None, None).await.unwrap();
    assert_eq!(app.tree().folder(&ItemId::new("20")).unwrap().title, "Development");

    app.remove_item(&ItemId::new("20")).await.unwrap();
    assert_eq!(app.ui().nav, FolderNav::Closed);
    assert!(!app.tree().contains(&ItemId::new("21")));
}

#[tokio::test(start_paused = true)]
async fn test_change_burst_refetches_once() {
    let (app, provider) = setup_synced_app().await;
    let app = Arc::new(Mutex::new(app));
    let toolbar_calls = provider.toolbar_calls();
    provider.push_external(remote_link("40", "delta"));

    let mut handlers = Vec::new();
    for _ in 0..3 {
        let app = Arc::clone(&app);
        handlers.push(tokio::spawn(async move { ShortcutsApp::handle_remote_change_debounced(&app).await }));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let mut outcomes = Vec::new();
    for handler in handlers {
        outcomes.push(handler.await.unwrap());
    }

    assert_eq!(outcomes, vec![false, false, true]);
    assert_eq!(provider.toolbar_calls(), toolbar_calls + 1);
    assert_eq!(root_titles(&*app.lock().await), vec!["alpha", "Dev", "beta", "delta"]);
}

#[tokio::test]
async fn test_debounced_change_ignored_while_local() {
    let app = Mutex::new(setup_app().await);
    assert!(!ShortcutsApp::handle_remote_change_debounced(&app).await);
}

#[tokio::test]
async fn test_connect_without_toolbar_stays_local() {
    let settings = Settings {
        connect_attempts: 1,
        ..Settings::default()
    };
    let mut app = ShortcutsApp::load(memory_store(), settings).await;
    assert!(!app.connect_remote(Arc::new(FakeProvider::without_toolbar())).await);
    assert!(!app.is_synced());
    assert!(app.take_notices().is_empty());
}
