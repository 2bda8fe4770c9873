//! Integration tests for returning visits, deep links and shell commands.

mod common;

use std::sync::Arc;

use waypoint_core::error::NavigationError;
use waypoint_core::phase::NavigationPhase;
use waypoint_core::store::KeyValueStore;
use waypoint_core::viewport::{MotionPreference, ScrollBehavior};
use waypoint_preferences::{DOCKED_KEY, JsonFileStore, MemoryStore};
use waypoint_shell::{ShellCommand, ShellError};

fn docked_store() -> Arc<dyn KeyValueStore> {
    let store = MemoryStore::new();
    store.set(DOCKED_KEY, "1").unwrap();
    Arc::new(store)
}

#[tokio::test(start_paused = true)]
async fn test_returning_visitor_never_sees_intro_or_toc() {
    let mut h = common::harness().store(docked_store()).start();
    let mut snapshots = h.shell.subscribe();

    common::settle(&mut h.shell, 8_000).await;

    assert_eq!(
        h.shell.navigation().orchestrator().phase(),
        NavigationPhase::Docked
    );
    assert!(!snapshots.has_changed().unwrap());
    assert_eq!(snapshots.borrow_and_update().phase, NavigationPhase::Docked);
    assert!(h.animation.played().is_empty());
    assert_eq!(h.shell.status().intro, None);
}

#[tokio::test(start_paused = true)]
async fn test_deep_link_skips_intro_and_scrolls_to_section() {
    let mut h = common::harness().start_at("/#setup").start();

    common::settle(&mut h.shell, 1).await;

    assert_eq!(
        h.shell.navigation().orchestrator().phase(),
        NavigationPhase::Docked
    );
    assert_eq!(
        h.viewport.scrolls(),
        vec![("setup".to_owned(), ScrollBehavior::Smooth)]
    );
    assert_eq!(h.shell.navigation().spy().active_section_id(), "setup");
}

#[tokio::test(start_paused = true)]
async fn test_non_home_start_is_docked() {
    let h = common::harness().start_at("/guide").start();

    assert_eq!(
        h.shell.navigation().orchestrator().phase(),
        NavigationPhase::Docked
    );
    assert_eq!(h.shell.path(), "/guide");
}

#[tokio::test(start_paused = true)]
async fn test_last_section_survives_reload_as_continue_target() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let mut first = common::harness()
        .store(Arc::new(JsonFileStore::new(&path)))
        .start();
    first.shell.execute(ShellCommand::Dock).unwrap();
    first
        .shell
        .execute(ShellCommand::Visible(vec!["setup".to_owned()]))
        .unwrap();
    common::settle(&mut first.shell, 700).await;
    first.shell.shutdown();

    // Act
    let second = common::harness()
        .store(Arc::new(JsonFileStore::new(&path)))
        .start();

    // Assert
    assert_eq!(
        second.shell.navigation().orchestrator().phase(),
        NavigationPhase::Docked
    );
    let target = second.shell.navigation().continue_target().unwrap();
    assert_eq!(target.id, "setup");
    assert_eq!(target.label, "Setup");
    assert_eq!(target.ts, 1_768_471_200_000);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_visibility_changes_persist_once() {
    let mut h = common::harness().store(docked_store()).start();

    for id in ["overview", "setup", "reference"] {
        h.shell
            .execute(ShellCommand::Visible(vec![id.to_owned()]))
            .unwrap();
        common::settle(&mut h.shell, 100).await;
    }
    let before_settle = h.shell.preferences().last_section();
    common::settle(&mut h.shell, 600).await;

    assert_eq!(before_settle, None);
    assert_eq!(
        h.shell.preferences().last_section().map(|s| s.id).as_deref(),
        Some("reference")
    );
}

#[tokio::test(start_paused = true)]
async fn test_undock_on_home_returns_to_toc_and_forget_clears() {
    let mut h = common::harness().store(docked_store()).start();

    h.shell.execute(ShellCommand::Undock).unwrap();
    let after_undock = h.shell.navigation().orchestrator().phase();
    h.shell.execute(ShellCommand::Dock).unwrap();
    h.shell.execute(ShellCommand::Forget).unwrap();

    assert_eq!(after_undock, NavigationPhase::TableOfContents);
    assert!(!h.shell.preferences().is_docked());
}

#[tokio::test(start_paused = true)]
async fn test_status_reports_json() {
    let mut h = common::harness().store(docked_store()).start();

    let output = h.shell.execute(ShellCommand::Status).unwrap().unwrap();

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["phase"], "docked");
    assert_eq!(json["path"], "/");
    assert_eq!(json["menus"].as_array().unwrap().len(), 3);
    assert_eq!(json["menus"][2]["kind"], "mobile");
    assert_eq!(json["menus"][2]["visible"], true);
    assert_eq!(json["persistent"], true);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_page_and_section_are_reported() {
    let mut h = common::harness().store(docked_store()).start();

    let page = h.shell.execute(ShellCommand::Goto("/missing".to_owned()));
    let section = h.shell.execute(ShellCommand::Scroll("missing".to_owned()));

    assert!(matches!(page, Err(ShellError::PageNotFound(path)) if path == "/missing"));
    match section {
        Err(ShellError::Navigation(NavigationError::SectionNotFound(id))) => {
            assert_eq!(id, "missing");
        }
        other => panic!("expected SectionNotFound, got {other:?}"),
    }
    assert_eq!(h.shell.path(), "/");
}

#[tokio::test(start_paused = true)]
async fn test_reduced_motion_switch_makes_scrolls_instant() {
    let mut h = common::harness().store(docked_store()).start();

    h.shell
        .execute(ShellCommand::Motion { reduced: true })
        .unwrap();
    h.shell
        .execute(ShellCommand::Scroll("reference".to_owned()))
        .unwrap();

    assert_eq!(
        h.viewport.scrolls(),
        vec![("reference".to_owned(), ScrollBehavior::Instant)]
    );
    assert!(h.motion.prefers_reduced_motion());
}
