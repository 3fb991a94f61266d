//! Tests for session save and restore.
//!
//! Covers the in-memory round trip, the YAML file round trip, per-entry
//! failure isolation and monitor-contributed state.

mod common;

use common::{RecordingMonitor, drain, event_log, mail_engine, mail_engine_with, open_modes};
use serde_json::json;
use tabdeck::session::storage::{load_session_from, save_session_to};
use tabdeck::{
    Config, EngineError, ModeDescriptor, SessionEntry, SessionRecord, TabTypeDescriptor,
};
use tempfile::tempdir;

fn titles(engine: &tabdeck::TabEngine) -> Vec<String> {
    engine
        .tabs()
        .tabs()
        .iter()
        .map(|tab| tab.title.clone())
        .collect()
}

#[test]
fn test_round_trip_reproduces_tabs_and_selection() {
    let log = event_log();
    let mut original = mail_engine(&log);
    original.open_tab("folder", json!({"title": "Inbox"})).unwrap();
    let message = original.open_tab("message", json!({"title": "Hi"})).unwrap();
    original.open_tab("page", json!({"title": "Docs"})).unwrap();
    original.switch_to_tab(message).unwrap();

    let record = original.save_session();
    assert_eq!(record.mode_names(), vec!["folder", "message", "page"]);
    assert_eq!(record.selected_index, Some(1));

    let mut restored = mail_engine(&log);
    let report = restored.restore_session(&record);
    assert!(report.is_clean());
    assert_eq!(report.restored.len(), 3);

    assert_eq!(open_modes(&restored), open_modes(&original));
    assert_eq!(titles(&restored), vec!["Inbox", "Hi", "Docs"]);
    assert_eq!(restored.tabs().active_tab_index(), Some(1));
}

#[test]
fn test_round_trip_through_session_file() {
    let log = event_log();
    let mut original = mail_engine(&log);
    original.open_tab("folder", json!({"title": "Inbox"})).unwrap();
    original.open_tab("page", json!({"title": "Docs"})).unwrap();

    let temp = tempdir().unwrap();
    let path = temp.path().join("last_session.yaml");
    save_session_to(&original.save_session(), &path).unwrap();

    let record = load_session_from(&path).unwrap().unwrap();
    let mut restored = mail_engine(&log);
    let report = restored.restore_session(&record);

    assert!(report.is_clean());
    assert_eq!(open_modes(&restored), vec!["folder", "page"]);
    assert_eq!(restored.tabs().active_tab_index(), Some(1));
}

#[test]
fn test_restored_tabs_open_in_background_until_selection() {
    let log = event_log();
    let mut engine = mail_engine(&log);
    let mut record = SessionRecord::new();
    record.tabs.push(SessionEntry::new("folder", json!({"title": "a"})));
    record.tabs.push(SessionEntry::new("message", json!({"title": "b"})));
    record.tabs.push(SessionEntry::new("message", json!({"title": "c"})));
    record.selected_index = Some(2);

    engine.restore_session(&record);
    let shows: Vec<String> = drain(&log)
        .into_iter()
        .filter(|e| e.starts_with("show:"))
        .collect();
    assert_eq!(shows, vec!["show:folder:1", "show:message:3"]);
    assert_eq!(engine.current_tab_id(), Some(3));
}

#[test]
fn test_unknown_mode_is_reported_and_skipped() {
    let log = event_log();
    let mut engine = mail_engine(&log);
    let mut record = SessionRecord::new();
    record.tabs.push(SessionEntry::new("folder", json!({})));
    record.tabs.push(SessionEntry::new("calendar", json!({"day": "2025-01-01"})));
    record.tabs.push(SessionEntry::new("message", json!({})));

    let report = engine.restore_session(&record);

    assert_eq!(report.restored.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].mode, "calendar");
    assert!(matches!(report.failures[0].error, EngineError::UnknownMode(_)));
    assert_eq!(open_modes(&engine), vec!["folder", "message"]);
}

#[test]
fn test_tabs_without_persist_hook_are_left_out() {
    let log = event_log();
    let mut engine = mail_engine(&log);
    engine
        .register_tab_type(
            TabTypeDescriptor::new("scratch")
                .shared_panel("scratchPanel")
                .mode(ModeDescriptor::new("note").on_open(|_, _| Ok(()))),
        )
        .unwrap();
    engine.open_tab("folder", json!({})).unwrap();
    let note = engine.open_tab("note", json!({})).unwrap();

    assert_eq!(engine.persist_tab(note).unwrap(), None);
    let record = engine.save_session();
    assert_eq!(record.mode_names(), vec!["folder"]);
    assert_eq!(record.selected_index, None);
}

#[test]
fn test_persist_hook_may_decline() {
    let mut engine = tabdeck::TabEngine::default();
    engine
        .register_tab_type(
            TabTypeDescriptor::new("content").shared_panel("P").mode(
                ModeDescriptor::new("page")
                    .on_open(|tab, args| {
                        tab.title = args["url"].as_str().unwrap_or_default().to_string();
                        Ok(())
                    })
                    .on_persist(|tab| {
                        (!tab.title.starts_with("about:")).then(|| json!({ "url": tab.title }))
                    })
                    .on_restore(|engine, state| {
                        engine.open_tab("page", state.clone())?;
                        Ok(())
                    }),
            ),
        )
        .unwrap();
    engine.open_tab("page", json!({"url": "about:blank"})).unwrap();
    engine.open_tab("page", json!({"url": "https://example.com"})).unwrap();

    let record = engine.save_session();
    assert_eq!(record.tabs.len(), 1);
    assert_eq!(record.tabs[0].state, json!({"url": "https://example.com"}));
    assert_eq!(record.selected_index, Some(0));
}

#[test]
fn test_mode_without_restore_hook_is_not_restorable() {
    let log = event_log();
    let mut engine = mail_engine(&log);
    engine
        .register_tab_type(
            TabTypeDescriptor::new("scratch")
                .shared_panel("scratchPanel")
                .mode(ModeDescriptor::new("note").on_open(|_, _| Ok(()))),
        )
        .unwrap();

    let mut record = SessionRecord::new();
    record.tabs.push(SessionEntry::new("note", json!({})));
    let report = engine.restore_session(&record);

    assert!(matches!(
        report.failures[0].error,
        EngineError::NotRestorable(ref mode) if mode == "note"
    ));
    assert_eq!(engine.tab_count(), 0);
}

#[test]
fn test_engine_errors_from_restore_hooks_pass_through() {
    let mut engine = tabdeck::TabEngine::default();
    engine
        .register_tab_type(
            TabTypeDescriptor::new("legacy").shared_panel("P").mode(
                ModeDescriptor::new("old")
                    .on_open(|_, _| Ok(()))
                    .on_persist(|_| Some(json!(null)))
                    .on_restore(|engine, state| {
                        // Older sessions stored a mode that no longer exists
                        engine.open_tab("older", state.clone())?;
                        Ok(())
                    }),
            ),
        )
        .unwrap();
    engine
        .register_tab_type(
            TabTypeDescriptor::new("flaky").shared_panel("Q").mode(
                ModeDescriptor::new("flaky")
                    .on_open(|_, _| Ok(()))
                    .on_persist(|_| Some(json!(null)))
                    .on_restore(|_, _| anyhow::bail!("state is from a newer version")),
            ),
        )
        .unwrap();

    let mut record = SessionRecord::new();
    record.tabs.push(SessionEntry::new("old", json!(null)));
    record.tabs.push(SessionEntry::new("flaky", json!(null)));
    let report = engine.restore_session(&record);

    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        report.failures[0].error,
        EngineError::UnknownMode(ref mode) if mode == "older"
    ));
    assert!(matches!(
        report.failures[1].error,
        EngineError::HookFailed { hook: "restore", .. }
    ));
}

#[test]
fn test_restore_hook_that_opens_nothing_is_skipped() {
    let mut engine = tabdeck::TabEngine::default();
    engine
        .register_tab_type(
            TabTypeDescriptor::new("t").shared_panel("P").mode(
                ModeDescriptor::new("m")
                    .on_open(|_, _| Ok(()))
                    .on_persist(|_| Some(json!(null)))
                    .on_restore(|_, _| Ok(())),
            ),
        )
        .unwrap();

    let mut record = SessionRecord::new();
    record.tabs.push(SessionEntry::new("m", json!(null)));
    let report = engine.restore_session(&record);

    assert!(report.is_clean());
    assert!(report.restored.is_empty());
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_monitor_state_travels_with_the_tab() {
    let log = event_log();
    let events = event_log();
    let mut original = mail_engine(&log);
    original.register_tab_monitor(Box::new(RecordingMonitor::new("filter", &events).persisting()));
    original.register_tab_monitor(Box::new(RecordingMonitor::new("quiet", &events)));
    original.open_tab("folder", json!({})).unwrap();
    let page = original.open_tab("page", json!({})).unwrap();

    let record = original.save_session();
    assert_eq!(record.tabs[1].monitors.get("filter"), Some(&json!({ "seen": page })));
    assert!(!record.tabs[1].monitors.contains_key("quiet"));

    let restored_events = event_log();
    let mut restored = mail_engine(&log);
    restored.register_tab_monitor(Box::new(RecordingMonitor::new(
        "filter",
        &restored_events,
    )));
    restored.register_tab_monitor(Box::new(RecordingMonitor::new(
        "quiet",
        &restored_events,
    )));
    restored.restore_session(&record);

    let delivered: Vec<String> = drain(&restored_events)
        .into_iter()
        .filter(|e| e.contains("tab_restored"))
        .collect();
    assert_eq!(
        delivered,
        vec![
            "filter:tab_restored:1:{\"seen\":1}",
            "filter:tab_restored:2:{\"seen\":2}",
        ]
    );
}

#[test]
fn test_restore_redirected_by_dedup_keeps_selection() {
    let log = event_log();
    let mut engine = mail_engine(&log);
    engine
        .register_tab_type(
            TabTypeDescriptor::new("search").shared_panel("S").mode(
                ModeDescriptor::new("s")
                    .on_open(|_, _| Ok(()))
                    .should_switch_to(|_, tabs| {
                        tabs.iter().find(|t| t.mode() == "s").map(|t| t.id())
                    })
                    .on_persist(|_| Some(json!({})))
                    .on_restore(|engine, state| {
                        engine.open_tab("s", state.clone())?;
                        Ok(())
                    }),
            ),
        )
        .unwrap();
    let folder = engine.open_tab("folder", json!({})).unwrap();
    engine.open_tab_in_background("s", json!({})).unwrap();

    let mut record = SessionRecord::new();
    record.tabs.push(SessionEntry::new("s", json!({})));
    let report = engine.restore_session(&record);

    assert!(report.is_clean());
    assert_eq!(report.skipped, 1);
    assert_eq!(engine.tab_count(), 2);
    assert_eq!(engine.current_tab_id(), Some(folder));
}

#[test]
fn test_startup_restore_follows_config() {
    let log = event_log();
    let temp = tempdir().unwrap();
    let path = temp.path().join("last_session.yaml");

    let mut original = mail_engine(&log);
    original.open_tab("folder", json!({"title": "Inbox"})).unwrap();
    original.open_tab("page", json!({"title": "Docs"})).unwrap();
    save_session_to(&original.save_session(), &path).unwrap();

    let mut config = Config::default();
    config.session.file = Some(path.clone());
    let mut engine = mail_engine_with(config.clone(), &log);
    let report = engine.restore_last_session().unwrap().unwrap();
    assert!(report.is_clean());
    assert_eq!(open_modes(&engine), vec!["folder", "page"]);

    config.session.restore_on_startup = false;
    let mut engine = mail_engine_with(config, &log);
    assert!(engine.restore_last_session().unwrap().is_none());
    assert_eq!(engine.tab_count(), 0);
}

#[test]
fn test_startup_restore_without_saved_session() {
    let log = event_log();
    let temp = tempdir().unwrap();
    let mut config = Config::default();
    config.session.file = Some(temp.path().join("missing.yaml"));

    let mut engine = mail_engine_with(config, &log);
    assert!(engine.restore_last_session().unwrap().is_none());
}
