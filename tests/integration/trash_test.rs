//! Integration tests for soft delete, restore and purge.

use std::sync::Arc;

use filetree_core::config::AppConfig;
use filetree_core::error::ErrorKind;
use filetree_core::types::path::{self, TRASH_SENTINEL};
use filetree_entity::entity::EntityKind;

use crate::helpers::TestApp;

/// `/docs/a.txt` (5), `/docs/old` (9), `/docs/old/b.txt` (10)
async fn docs_tree(app: &TestApp) -> i64 {
    let docs = app
        .insert_entity(2, "/docs", app.root.id, EntityKind::Folder)
        .await;
    app.insert_entity(5, "/docs/a.txt", docs.id, EntityKind::File)
        .await;
    app.insert_entity(9, "/docs/old", docs.id, EntityKind::Folder)
        .await;
    app.insert_entity(10, "/docs/old/b.txt", 9, EntityKind::File)
        .await;
    docs.id
}

#[tokio::test]
async fn test_delete_marks_folder_and_descendants() {
    let app = TestApp::new().await;
    docs_tree(&app).await;

    app.state.trash.delete(&app.ctx, "/docs/old").await.unwrap();

    let old = app.entity(9).await.unwrap();
    assert_eq!(old.path, "./docs/old");
    assert_eq!(old.folder, TRASH_SENTINEL);

    let b = app.entity(10).await.unwrap();
    assert_eq!(b.path, "./docs/old/b.txt");
    assert_eq!(b.folder, 9);

    let a = app.entity(5).await.unwrap();
    assert_eq!(a.path, "/docs/a.txt");
}

#[tokio::test]
async fn test_restore_to_free_path_is_unchanged() {
    let app = TestApp::new().await;
    let docs = docs_tree(&app).await;

    app.state.trash.delete(&app.ctx, "/docs/old").await.unwrap();
    let restored = app.state.trash.restore(&app.ctx, 9).await.unwrap();

    assert_eq!(restored.path, "/docs/old");
    assert_eq!(restored.name, "old");
    assert_eq!(restored.folder, docs);

    let b = app.entity(10).await.unwrap();
    assert_eq!(b.path, "/docs/old/b.txt");
    assert_eq!(b.folder, 9);
}

#[tokio::test]
async fn test_restore_into_occupied_path_gets_suffix() {
    let app = TestApp::new().await;
    let docs = docs_tree(&app).await;

    app.state.trash.delete(&app.ctx, "/docs/old").await.unwrap();
    let occupant = app.mkdir("/docs", "old").await;

    let restored = app.state.trash.restore(&app.ctx, 9).await.unwrap();
    assert_eq!(restored.path, "/docs/old.restored");
    assert_eq!(restored.name, "old.restored");
    assert_eq!(restored.folder, docs);

    let b = app.entity(10).await.unwrap();
    assert_eq!(b.path, "/docs/old.restored/b.txt");
    assert_eq!(b.folder, 9);

    let occupant = app.entity(occupant.id).await.unwrap();
    assert_eq!(occupant.path, "/docs/old");
}

#[tokio::test]
async fn test_round_trip_preserves_deep_subtree() {
    let app = TestApp::new().await;
    app.mkdir("/", "p").await;
    app.mkdir("/p", "q").await;
    app.mkdir("/p/q", "r").await;
    app.mkfile("/p/q/r", "deep.txt", "deep").await;
    app.mkfile("/p", "top.txt", "top").await;
    app.mkfile("/", "outside.txt", "outside").await;
    let before = app.snapshot().await;

    app.state.trash.delete(&app.ctx, "/p").await.unwrap();

    let trashed = app.snapshot().await;
    for (_, entity_path, _, _) in &trashed {
        let inside = entity_path.starts_with("./p/") || entity_path == "./p";
        let untouched = entity_path == "/" || entity_path == "/outside.txt";
        assert!(inside || untouched, "unexpected path after delete: {entity_path}");
    }

    let p = before
        .iter()
        .find(|(_, entity_path, _, _)| entity_path == "/p")
        .unwrap()
        .0;
    app.state.trash.restore(&app.ctx, p).await.unwrap();

    assert_eq!(app.snapshot().await, before);
}

#[tokio::test]
async fn test_delete_twice_is_a_precondition_failure() {
    let app = TestApp::new().await;
    app.mkdir("/", "gone").await;
    app.mkfile("/gone", "child.txt", "x").await;
    app.state.trash.delete(&app.ctx, "/gone").await.unwrap();
    let before = app.snapshot().await;

    let err = app.state.trash.delete(&app.ctx, "/gone").await.unwrap_err();
    assert!(err.is(ErrorKind::PreconditionFailed));

    let err = app.state.trash.delete(&app.ctx, "./gone").await.unwrap_err();
    assert!(err.is(ErrorKind::PreconditionFailed));

    assert_eq!(app.snapshot().await, before);
}

#[tokio::test]
async fn test_missing_and_wrong_state_errors() {
    let app = TestApp::new().await;
    let active = app.mkfile("/", "active.txt", "x").await;

    let err = app.state.trash.delete(&app.ctx, "/nope").await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = app.state.trash.restore(&app.ctx, 4242).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = app.state.trash.purge(&app.ctx, 4242).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = app.state.trash.restore(&app.ctx, active.id).await.unwrap_err();
    assert!(err.is(ErrorKind::PreconditionFailed));

    let err = app.state.trash.purge(&app.ctx, active.id).await.unwrap_err();
    assert!(err.is(ErrorKind::PreconditionFailed));

    let err = app.state.trash.delete(&app.ctx, "/").await.unwrap_err();
    assert!(err.is(ErrorKind::PreconditionFailed));
}

#[tokio::test]
async fn test_repeated_restores_get_distinct_names() {
    let app = TestApp::new().await;
    let mut trashed = Vec::new();
    for i in 0..4 {
        let file = app.mkfile("/", "x.txt", &format!("copy {i}")).await;
        app.state.trash.delete(&app.ctx, "/x.txt").await.unwrap();
        trashed.push(file.id);
    }
    app.mkfile("/", "x.txt", "occupant").await;

    let mut paths = vec!["/x.txt".to_string()];
    for id in trashed {
        let restored = app.state.trash.restore(&app.ctx, id).await.unwrap();
        assert!(!paths.contains(&restored.path), "{} restored twice", restored.path);
        assert_eq!(restored.name, path::base_name(&restored.path));
        paths.push(restored.path);
    }

    assert_eq!(
        &paths[1..],
        [
            "/x.txt.restored",
            "/x.txt.restored.restored",
            "/x.txt.restored.restored.restored",
            "/x.txt.restored.restored.restored.restored",
        ]
    );
}

#[tokio::test]
async fn test_restore_gives_up_after_attempt_limit() {
    let mut config = AppConfig::default();
    config.trash.max_restore_attempts = 2;
    let app = TestApp::with_config(config).await;

    let file = app.mkfile("/", "a", "first").await;
    app.state.trash.delete(&app.ctx, "/a").await.unwrap();
    app.mkfile("/", "a", "second").await;
    app.mkfile("/", "a.restored", "third").await;

    let err = app.state.trash.restore(&app.ctx, file.id).await.unwrap_err();
    assert!(err.is(ErrorKind::Conflict));

    let still_trashed = app.entity(file.id).await.unwrap();
    assert!(still_trashed.is_trashed());
}

#[tokio::test]
async fn test_restore_falls_back_to_root_when_parent_is_gone() {
    let app = TestApp::new().await;
    app.mkdir("/", "f").await;
    let child = app.mkfile("/f", "g.txt", "g").await;

    app.state.trash.delete(&app.ctx, "/f/g.txt").await.unwrap();
    app.state.trash.delete(&app.ctx, "/f").await.unwrap();

    let restored = app.state.trash.restore(&app.ctx, child.id).await.unwrap();
    assert_eq!(restored.path, "/g.txt");
    assert_eq!(restored.folder, app.root.id);
}

#[tokio::test]
async fn test_trash_lists_only_subtree_roots() {
    let app = TestApp::new().await;
    app.mkdir("/", "box").await;
    app.mkfile("/box", "inner.txt", "i").await;
    app.mkfile("/", "loose.txt", "l").await;

    app.state.trash.delete(&app.ctx, "/box").await.unwrap();
    app.state.trash.delete(&app.ctx, "/loose.txt").await.unwrap();

    let trash = app.state.trash.list_trash(&app.ctx).await.unwrap();
    let names: Vec<&str> = trash.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["box", "loose.txt"]);
    assert!(trash.iter().all(|e| e.is_trash_root()));
}

#[tokio::test]
async fn test_dotted_names_are_not_trashed() {
    let app = TestApp::new().await;
    let env = app.mkfile("/", ".env", "SECRET=1").await;
    assert_eq!(env.path, "/.env");
    assert!(!env.is_trashed());
    assert!(app.state.trash.list_trash(&app.ctx).await.unwrap().is_empty());

    app.state.trash.delete(&app.ctx, "/.env").await.unwrap();
    assert_eq!(app.entity(env.id).await.unwrap().path, "./.env");

    let restored = app.state.trash.restore(&app.ctx, env.id).await.unwrap();
    assert_eq!(restored.path, "/.env");
}

#[tokio::test]
async fn test_purge_removes_subtree_and_markers_but_keeps_history() {
    let app = TestApp::new().await;
    let folder = app.mkdir("/", "d").await;
    let file = app.mkfile("/d", "e.txt", "content").await;
    let edit = app
        .state
        .versions
        .list(&app.ctx, "/d/e.txt")
        .await
        .unwrap()
        .remove(0);

    app.add_favorite(app.ctx.user_id, file.id).await;
    app.add_favorite(app.ctx.user_id + 1, folder.id).await;
    let tag = app.create_tag("work").await;
    app.tag_entity(file.id, tag).await;
    app.tag_entity(folder.id, tag).await;
    app.share_entity(folder.id, 7).await;

    app.state.trash.delete(&app.ctx, "/d").await.unwrap();
    app.state.trash.purge(&app.ctx, folder.id).await.unwrap();

    assert!(app.entity(folder.id).await.is_none());
    assert!(app.entity(file.id).await.is_none());

    let file_markers = app.marker_counts(file.id).await;
    assert_eq!((file_markers.favorites, file_markers.tags, file_markers.shares), (0, 0, 0));
    let folder_markers = app.marker_counts(folder.id).await;
    assert_eq!(folder_markers.tags, 0);
    assert_eq!(folder_markers.shares, 0);
    // another user's favorite is not ours to clear
    assert_eq!(folder_markers.favorites, 1);

    assert_eq!(app.edit_count(file.id).await, 1);
    let err = app.state.versions.read(&app.ctx, edit.id, false).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_readonly_context_cannot_change_the_trash() {
    let app = TestApp::new().await;
    let file = app.mkfile("/", "keep.txt", "k").await;
    let readonly = filetree_service::RequestContext::new(app.ctx.user_id, app.tree(), true);

    let err = app.state.trash.delete(&readonly, "/keep.txt").await.unwrap_err();
    assert!(err.is(ErrorKind::Authorization));

    app.state.trash.delete(&app.ctx, "/keep.txt").await.unwrap();
    let err = app.state.trash.restore(&readonly, file.id).await.unwrap_err();
    assert!(err.is(ErrorKind::Authorization));
    let err = app.state.trash.purge(&readonly, file.id).await.unwrap_err();
    assert!(err.is(ErrorKind::Authorization));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_restores_into_one_slot_get_distinct_names() {
    let app = TestApp::file_backed().await;
    let mut trashed = Vec::new();
    for i in 0..8 {
        let file = app.mkfile("/", "x.txt", &format!("copy {i}")).await;
        app.state.trash.delete(&app.ctx, "/x.txt").await.unwrap();
        trashed.push(file.id);
    }

    let tasks: Vec<_> = trashed
        .into_iter()
        .map(|id| {
            let trash = Arc::clone(&app.state.trash);
            let ctx = app.ctx.clone();
            tokio::spawn(async move { trash.restore(&ctx, id).await })
        })
        .collect();

    let mut paths = Vec::new();
    for task in tasks {
        let restored = task.await.unwrap().unwrap();
        paths.push(restored.path);
    }
    paths.sort();

    let mut expected: Vec<String> = (0..8)
        .map(|n| format!("/x.txt{}", ".restored".repeat(n)))
        .collect();
    expected.sort();
    assert_eq!(paths, expected);
    assert!(app.state.trash.list_trash(&app.ctx).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_deletes_and_restores_keep_subtrees_intact() {
    let app = TestApp::file_backed().await;
    for dir in ["a", "b"] {
        app.mkdir("/", dir).await;
        app.mkdir(&format!("/{dir}"), "inner").await;
        app.mkfile(&format!("/{dir}/inner"), "f.txt", dir).await;
    }
    let mut trashed = Vec::new();
    for i in 0..4 {
        let file = app.mkfile("/", "c.txt", &format!("c {i}")).await;
        app.state.trash.delete(&app.ctx, "/c.txt").await.unwrap();
        trashed.push(file.id);
    }

    let mut tasks = Vec::new();
    for dir in ["/a", "/b"] {
        let trash = Arc::clone(&app.state.trash);
        let ctx = app.ctx.clone();
        tasks.push(tokio::spawn(async move {
            trash.delete(&ctx, dir).await.map(|()| dir.to_string())
        }));
    }
    for id in trashed {
        let trash = Arc::clone(&app.state.trash);
        let ctx = app.ctx.clone();
        tasks.push(tokio::spawn(async move {
            trash.restore(&ctx, id).await.map(|e| e.path)
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // every child sits exactly under its parent, trashed or not
    let rows = app.snapshot().await;
    for (id, entity_path, name, folder) in &rows {
        if *folder <= 0 {
            continue;
        }
        let parent = rows
            .iter()
            .find(|(pid, _, _, _)| pid == folder)
            .unwrap_or_else(|| panic!("entity {id} lost its parent {folder}"));
        assert_eq!(entity_path, &path::join(&parent.1, name));
    }

    let trash = app.state.trash.list_trash(&app.ctx).await.unwrap();
    let names: Vec<&str> = trash.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);

    let active = app.state.drive.list(&app.ctx, "/").await.unwrap();
    assert_eq!(active.len(), 4);
    assert!(active.iter().all(|e| e.name.starts_with("c.txt")));
}
