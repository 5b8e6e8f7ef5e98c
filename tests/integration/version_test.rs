//! Integration tests for version history.

use bytes::Bytes;

use filetree_core::error::ErrorKind;
use filetree_service::RequestContext;
use filetree_service::version::{DiffOp, DiffSpan};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_every_write_appends_a_version() {
    let app = TestApp::new().await;
    app.mkfile("/", "notes.txt", "one").await;
    app.write("/notes.txt", "two").await;
    app.write("/notes.txt", "three").await;

    let versions = app.state.versions.list(&app.ctx, "/notes.txt").await.unwrap();
    assert_eq!(versions.len(), 3);
    for pair in versions.windows(2) {
        assert!(pair[0].modified >= pair[1].modified);
        assert!(pair[0].id > pair[1].id);
    }

    let newest = app.state.versions.read(&app.ctx, versions[0].id, false).await.unwrap();
    assert_eq!(newest.text(), Some("three"));
    let oldest = app.state.versions.read(&app.ctx, versions[2].id, false).await.unwrap();
    assert_eq!(oldest.text(), Some("one"));
}

#[tokio::test]
async fn test_previous_points_at_the_prior_version() {
    let app = TestApp::new().await;
    app.mkfile("/", "p.txt", "before").await;
    app.write("/p.txt", "after").await;

    let versions = app.state.versions.list(&app.ctx, "/p.txt").await.unwrap();
    let (second, first) = (&versions[0], &versions[1]);
    assert_eq!(first.previous, None);
    assert_eq!(second.previous.as_deref(), Some(first.content.as_str()));
    assert_ne!(first.content, second.content);
}

#[tokio::test]
async fn test_read_with_diff() {
    let app = TestApp::new().await;
    app.mkfile("/", "d.txt", "hello world").await;
    app.write("/d.txt", "hello brave world").await;

    let versions = app.state.versions.list(&app.ctx, "/d.txt").await.unwrap();

    let view = app.state.versions.read(&app.ctx, versions[0].id, true).await.unwrap();
    assert_eq!(
        view.diff.unwrap(),
        vec![
            DiffSpan {
                op: DiffOp::Equal,
                text: "hello ".to_string()
            },
            DiffSpan {
                op: DiffOp::Insert,
                text: "brave ".to_string()
            },
            DiffSpan {
                op: DiffOp::Equal,
                text: "world".to_string()
            },
        ]
    );

    let first = app.state.versions.read(&app.ctx, versions[1].id, true).await.unwrap();
    assert!(first.diff.is_none());

    let undiffed = app.state.versions.read(&app.ctx, versions[0].id, false).await.unwrap();
    assert!(undiffed.diff.is_none());
}

#[tokio::test]
async fn test_binary_versions_are_not_diffed() {
    let app = TestApp::new().await;
    app.mkfile("/", "blob.bin", "text first").await;
    app.state
        .drive
        .write(&app.ctx, "/blob.bin", Bytes::from_static(&[0xff, 0xfe, 0x00]), None)
        .await
        .unwrap();

    let versions = app.state.versions.list(&app.ctx, "/blob.bin").await.unwrap();
    let view = app.state.versions.read(&app.ctx, versions[0].id, true).await.unwrap();
    assert!(view.diff.is_none());
    assert_eq!(view.content.as_ref(), &[0xff, 0xfe, 0x00]);
}

#[tokio::test]
async fn test_revert_is_additive() {
    let app = TestApp::new().await;
    app.mkfile("/", "r.txt", "original").await;
    app.write("/r.txt", "changed").await;

    let before = app.state.versions.list(&app.ctx, "/r.txt").await.unwrap();
    let target = before.last().unwrap().clone();

    let reverted = app
        .state
        .versions
        .revert(&app.ctx, "/r.txt", target.id)
        .await
        .unwrap();
    assert_eq!(reverted.path, "/r.txt");
    assert_eq!(reverted.content, target.content);

    let after = app.state.versions.list(&app.ctx, "/r.txt").await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let newest = &after[0];
    assert_eq!(newest.content, target.content);
    assert_eq!(newest.origin, Some(target.modified));
    assert!(newest.is_revert());

    // the earlier records are untouched
    assert_eq!(&after[1..], &before[..]);

    let current = app.state.drive.read(&app.ctx, "/r.txt").await.unwrap();
    assert_eq!(current, Bytes::from("original"));
}

#[tokio::test]
async fn test_revert_rejects_versions_of_other_files() {
    let app = TestApp::new().await;
    app.mkfile("/", "mine.txt", "m").await;
    app.mkfile("/", "theirs.txt", "t").await;
    let theirs = app.state.versions.list(&app.ctx, "/theirs.txt").await.unwrap();

    let err = app
        .state
        .versions
        .revert(&app.ctx, "/mine.txt", theirs[0].id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = app
        .state
        .versions
        .revert(&app.ctx, "/mine.txt", 9999)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_history_rows_cannot_be_rewritten() {
    let app = TestApp::new().await;
    app.mkfile("/", "h.txt", "h").await;
    let pool = app.state.db.pool();

    let updated = sqlx::query("UPDATE entity_edit SET content = 'forged'")
        .execute(pool)
        .await;
    assert!(updated.is_err());

    let deleted = sqlx::query("DELETE FROM entity_edit").execute(pool).await;
    assert!(deleted.is_err());

    let versions = app.state.versions.list(&app.ctx, "/h.txt").await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_ne!(versions[0].content, "forged");
}

#[tokio::test]
async fn test_trashed_files_have_no_listable_history() {
    let app = TestApp::new().await;
    app.mkfile("/", "t.txt", "t").await;
    app.state.trash.delete(&app.ctx, "/t.txt").await.unwrap();

    let err = app.state.versions.list(&app.ctx, "/t.txt").await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    let err = app.state.versions.list(&app.ctx, "./t.txt").await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_readonly_context_cannot_write_or_revert() {
    let app = TestApp::new().await;
    app.mkfile("/", "ro.txt", "ro").await;
    let version = app.state.versions.list(&app.ctx, "/ro.txt").await.unwrap()[0].id;
    let readonly = RequestContext::new(app.ctx.user_id, app.tree(), true);

    let err = app
        .state
        .versions
        .revert(&readonly, "/ro.txt", version)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authorization));

    let err = app
        .state
        .drive
        .write(&readonly, "/ro.txt", Bytes::from("x"), None)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Authorization));

    assert_eq!(app.edit_count(app.state.drive.info(&readonly, "/ro.txt").await.unwrap().id).await, 1);
}
