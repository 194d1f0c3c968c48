use std::path::PathBuf;

use shared::domain::NotificationCategory;

use super::*;
use crate::test_support::{Effect, Harness};

fn notes() -> PathBuf {
    PathBuf::from("/home/lin/notes.txt")
}

#[tokio::test]
async fn declining_delete_keeps_the_buffer_and_never_removes() {
    let harness = Harness::new();
    harness.fs.insert(notes(), "draft");
    let files = harness.files();
    let handle = FileHandle::opened(notes(), "draft".into());
    files.replace(Some(handle.clone())).await;
    harness.dialogs.answer(false);

    let report = files.delete().await;

    assert_eq!(report.state, WorkflowState::Cancelled);
    assert_eq!(files.current().await, Some(handle));
    assert_eq!(harness.fs.contents(notes()).as_deref(), Some("draft"));
    assert!(!harness
        .effects
        .all()
        .iter()
        .any(|effect| matches!(effect, Effect::Removed(_))));
    assert_eq!(
        harness.effects.messages().last().map(|(_, _, text)| text.clone()),
        Some("Deletion cancelled".to_string())
    );
}

#[tokio::test]
async fn delete_without_a_saved_file_asks_to_select_one() {
    let harness = Harness::new();
    let files = harness.files();
    files.edit("unsaved text").await;

    let report = files.delete().await;

    assert_eq!(report.kind, WorkflowKind::DeleteFile);
    assert_eq!(report.state, WorkflowState::Cancelled);
    assert_eq!(
        harness.effects.all(),
        vec![Effect::Message(
            MessageKind::Warning,
            NOTICE_TITLE.to_string(),
            SELECT_FILE_FIRST.to_string()
        )]
    );
}

#[tokio::test]
async fn confirmed_delete_removes_clears_and_reports() {
    let harness = Harness::new();
    harness.fs.insert(notes(), "draft");
    let files = harness.files();
    files
        .replace(Some(FileHandle::opened(notes(), "draft".into())))
        .await;

    let report = files.delete().await;

    assert_eq!(report.state, WorkflowState::Completed);
    assert_eq!(files.current().await, None);
    assert_eq!(harness.fs.contents(notes()), None);

    let effects = harness.effects.all();
    let removed = effects
        .iter()
        .position(|effect| matches!(effect, Effect::Removed(_)))
        .expect("removed");
    let notified = effects
        .iter()
        .position(|effect| matches!(effect, Effect::Notified(n) if n.category == NotificationCategory::Success))
        .expect("notified");
    let informed = effects
        .iter()
        .position(|effect| matches!(effect, Effect::Message(_, _, text) if text == "File deleted successfully"))
        .expect("informed");
    assert!(matches!(&effects[0], Effect::Ask(_, prompt) if prompt.contains("notes.txt")));
    assert!(removed < notified && notified < informed);
}

#[tokio::test]
async fn failed_removal_keeps_the_buffer() {
    let harness = Harness::new();
    harness.fs.insert(notes(), "draft");
    harness.fs.fail_removes("permission denied");
    let files = harness.files();
    files
        .replace(Some(FileHandle::opened(notes(), "draft".into())))
        .await;

    let report = files.delete().await;

    assert_eq!(report.state, WorkflowState::Failed("permission denied".into()));
    assert!(files.current().await.is_some());
    assert_eq!(
        harness.effects.messages().last(),
        Some(&(
            MessageKind::Error,
            ERROR_TITLE.to_string(),
            "File deletion failed: permission denied".to_string()
        ))
    );
}

#[tokio::test]
async fn save_without_a_path_goes_through_the_picker() {
    let harness = Harness::new();
    harness.dialogs.choose_save_path("/tmp/out.txt");
    let files = harness.files();
    files.edit("hello").await;

    let report = files.save().await;

    assert_eq!(report.state, WorkflowState::Completed);
    assert_eq!(harness.fs.contents("/tmp/out.txt").as_deref(), Some("hello"));
    let handle = files.current().await.expect("buffer");
    assert_eq!(handle.path, Some(PathBuf::from("/tmp/out.txt")));
    assert!(!handle.dirty);
    assert_eq!(
        harness.effects.all().first(),
        Some(&Effect::PickSavePath("untitled.txt".to_string()))
    );
}

#[tokio::test]
async fn save_with_a_bound_path_skips_the_picker() {
    let harness = Harness::new();
    harness.fs.insert(notes(), "old");
    let files = harness.files();
    files
        .replace(Some(FileHandle::opened(notes(), "old".into())))
        .await;
    files.edit("new").await;

    let report = files.save().await;

    assert_eq!(report.state, WorkflowState::Completed);
    assert_eq!(harness.fs.contents(notes()).as_deref(), Some("new"));
    assert!(!harness
        .effects
        .all()
        .iter()
        .any(|effect| matches!(effect, Effect::PickSavePath(_))));
}

#[tokio::test]
async fn cancelled_save_picker_writes_nothing() {
    let harness = Harness::new();
    let files = harness.files();
    files.edit("hello").await;

    let report = files.save_as().await;

    assert_eq!(report.state, WorkflowState::Cancelled);
    assert!(harness.effects.messages().is_empty());
    assert!(files.current().await.expect("buffer").dirty);
}

#[tokio::test]
async fn failed_write_sends_an_error_notification() {
    let harness = Harness::new();
    harness.dialogs.choose_save_path("/ro/out.txt");
    harness.fs.fail_writes("read-only file system");
    let files = harness.files();
    files.edit("hello").await;

    let report = files.save().await;

    assert_eq!(report.state, WorkflowState::Failed("read-only file system".into()));
    let sent = harness.notifications.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].category, NotificationCategory::Error);
    assert_eq!(sent[0].body, "File save failed: read-only file system");
    let handle = files.current().await.expect("buffer");
    assert_eq!(handle.path, None);
    assert!(handle.dirty);
}

#[tokio::test]
async fn open_binds_the_picked_file() {
    let harness = Harness::new();
    harness.fs.insert(notes(), "from disk");
    harness.dialogs.choose_file(notes());
    let files = harness.files();

    let handle = files.open().await.expect("open").expect("picked");

    assert_eq!(handle, FileHandle::opened(notes(), "from disk".into()));
    assert_eq!(files.current().await, Some(handle));
}

#[tokio::test]
async fn open_failures_are_shown_and_leave_the_buffer() {
    let harness = Harness::new();
    harness.dialogs.choose_file("/missing.txt");
    let files = harness.files();
    files.edit("keep me").await;

    let err = files.open().await.expect_err("missing file");

    assert!(err.contains("/missing.txt"), "{err}");
    assert_eq!(files.current().await.expect("buffer").content, "keep me");
    assert!(matches!(
        harness.effects.messages().last(),
        Some((MessageKind::Error, _, text)) if text.starts_with("Failed to open file")
    ));
}

#[tokio::test]
async fn cancelled_open_changes_nothing() {
    let harness = Harness::new();
    let files = harness.files();
    assert_eq!(files.open().await, Ok(None));
    assert_eq!(files.current().await, None);
}

#[tokio::test]
async fn directory_listing_is_replaced_on_each_selection() {
    let harness = Harness::new();
    harness
        .fs
        .insert_dir("/work", &[("src", true), ("Cargo.toml", false)]);
    harness.fs.insert_dir("/docs", &[("guide.md", false)]);
    let files = harness.files();

    harness.dialogs.choose_directory("/work");
    let first = files.select_directory().await.expect("list").expect("picked");
    assert_eq!(first.entries.len(), 2);
    assert!(first.entries[0].is_directory);

    harness.dialogs.choose_directory("/docs");
    let second = files.select_directory().await.expect("list").expect("picked");
    assert_eq!(second.root, PathBuf::from("/docs"));
    assert_eq!(second.entries.len(), 1);
    assert_eq!(second.entries[0].name, "guide.md");
}

#[tokio::test]
async fn broken_picker_is_reported() {
    let harness = Harness::new();
    harness.dialogs.break_pickers();
    let files = harness.files();

    assert!(files.select_directory().await.is_err());
    assert_eq!(harness.effects.messages().len(), 1);
}

#[tokio::test]
async fn exists_check_requires_a_path() {
    let harness = Harness::new();
    harness.fs.insert(notes(), "x");
    let files = harness.files();

    assert_eq!(files.check_exists("   ").await, Ok(None));
    assert_eq!(
        harness.effects.all(),
        vec![Effect::Message(
            MessageKind::Warning,
            NOTICE_TITLE.to_string(),
            ENTER_PATH_FIRST.to_string()
        )]
    );

    assert_eq!(
        files.check_exists(" /home/lin/notes.txt ").await,
        Ok(Some(true))
    );
    assert_eq!(files.check_exists("/nope").await, Ok(Some(false)));
}

#[tokio::test]
async fn close_drops_the_buffer() {
    let harness = Harness::new();
    let files = harness.files();
    files.edit("scratch").await;

    let closed = files.close().await.expect("closed buffer");
    assert_eq!(closed.content, "scratch");
    assert!(files.current().await.is_none());
}
