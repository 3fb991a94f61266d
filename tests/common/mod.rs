//! Shared integration test helpers for tabdeck.
//!
//! Test providers record every hook call into an [`EventLog`] so tests can
//! assert on ordering, and [`RecordingMonitor`] does the same for monitor
//! events.
//!
//! Include with `mod common;` at the top of each test file. The
//! `#![allow(dead_code)]` suppresses warnings when a file uses only a subset.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use tabdeck::{
    Config, LastTabPolicy, ModeDescriptor, MonitorEvent, MonitorResult, PerTabPanel, TabEngine,
    TabMonitor, TabRecord, TabTypeDescriptor,
};

/// Ordered record of hook and monitor calls, e.g. `"open:folder:1"`
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Take everything recorded so far, leaving the log empty
pub fn drain(log: &EventLog) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

pub fn engine_with_policy(policy: LastTabPolicy) -> TabEngine {
    let mut config = Config::default();
    config.tabs.last_tab_policy = policy;
    TabEngine::new(config)
}

/// A mode whose every lifecycle hook records into `log`.
///
/// The open hook takes its title from `args["title"]` (default: the mode
/// name) and fails when `args["fail"]` is true. Persisted state is
/// `{"title": ...}`, and the restore hook reopens the mode with that state as
/// its open arguments.
pub fn recording_mode(name: &str, log: &EventLog) -> ModeDescriptor {
    let mode = name.to_string();
    let open_log = Rc::clone(log);
    let close_log = Rc::clone(log);
    let save_log = Rc::clone(log);
    let show_log = Rc::clone(log);

    ModeDescriptor::new(name)
        .on_open(move |tab, args| {
            open_log
                .borrow_mut()
                .push(format!("open:{}:{}", tab.mode(), tab.id()));
            if args.get("fail").and_then(Value::as_bool).unwrap_or(false) {
                anyhow::bail!("content for tab {} is unavailable", tab.id());
            }
            tab.title = args
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(tab.mode())
                .to_string();
            Ok(())
        })
        .on_close(move |tab| {
            close_log
                .borrow_mut()
                .push(format!("close:{}:{}", tab.mode(), tab.id()));
        })
        .on_save_state(move |tab| {
            save_log
                .borrow_mut()
                .push(format!("save:{}:{}", tab.mode(), tab.id()));
        })
        .on_show(move |tab| {
            show_log
                .borrow_mut()
                .push(format!("show:{}:{}", tab.mode(), tab.id()));
        })
        .on_persist(|tab| Some(json!({ "title": tab.title })))
        .on_restore(move |engine, state| {
            engine.open_tab(&mode, state.clone())?;
            Ok(())
        })
}

/// A shared-panel tab type holding the given modes
pub fn shared_type(name: &str, panel_id: &str, modes: Vec<ModeDescriptor>) -> TabTypeDescriptor {
    modes
        .into_iter()
        .fold(TabTypeDescriptor::new(name).shared_panel(panel_id), |t, m| {
            t.mode(m)
        })
}

/// A per-tab-panel tab type holding the given modes
pub fn per_tab_type(name: &str, modes: Vec<ModeDescriptor>) -> TabTypeDescriptor {
    modes.into_iter().fold(
        TabTypeDescriptor::new(name).per_tab_panel(PerTabPanel::with_factory("vbox", |tab| {
            format!("content of tab {tab}")
        })),
        |t, m| t.mode(m),
    )
}

/// Engine with a shared-panel "mail" type (modes `folder`, the default, and
/// `message`) and a per-tab "content" type (mode `page`), all recording
pub fn mail_engine(log: &EventLog) -> TabEngine {
    mail_engine_with(Config::default(), log)
}

pub fn mail_engine_with(config: Config, log: &EventLog) -> TabEngine {
    let mut engine = TabEngine::new(config);
    engine
        .register_tab_type(shared_type(
            "mail",
            "mailContent",
            vec![
                recording_mode("folder", log).default_mode(),
                recording_mode("message", log),
            ],
        ))
        .unwrap();
    engine
        .register_tab_type(per_tab_type("content", vec![recording_mode("page", log)]))
        .unwrap();
    engine
}

/// Ordered mode names of the open tabs
pub fn open_modes(engine: &TabEngine) -> Vec<String> {
    engine
        .tabs()
        .tabs()
        .iter()
        .map(|tab| tab.mode().to_string())
        .collect()
}

/// Monitor that records every event into a shared log.
///
/// Entries look like `"<name>:<event>:<tab id>"`; `opened` also carries the
/// first-tab flag and the previous tab, `switched` the previous tab
/// (`-` when there was none).
pub struct RecordingMonitor {
    pub name: String,
    pub log: EventLog,
    /// Fail every callback for this event
    pub fail_on: Option<MonitorEvent>,
    /// Contribute `{"seen": <tab id>}` when tabs persist
    pub persist_state: bool,
}

impl RecordingMonitor {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: Rc::clone(log),
            fail_on: None,
            persist_state: false,
        }
    }

    pub fn failing_on(mut self, event: MonitorEvent) -> Self {
        self.fail_on = Some(event);
        self
    }

    pub fn persisting(mut self) -> Self {
        self.persist_state = true;
        self
    }

    fn record(&self, event: MonitorEvent, detail: String) -> MonitorResult {
        self.log
            .borrow_mut()
            .push(format!("{}:{}:{}", self.name, event, detail));
        if self.fail_on == Some(event) {
            anyhow::bail!("{} rejected {}", self.name, event);
        }
        Ok(())
    }
}

fn id_or_dash(tab: Option<&TabRecord>) -> String {
    tab.map(|t| t.id().to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl TabMonitor for RecordingMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_tab_opened(
        &mut self,
        tab: &TabRecord,
        is_first: bool,
        previous: Option<&TabRecord>,
    ) -> MonitorResult {
        self.record(
            MonitorEvent::TabOpened,
            format!("{}:{}:{}", tab.id(), is_first, id_or_dash(previous)),
        )
    }

    fn on_tab_switched(&mut self, tab: &TabRecord, previous: Option<&TabRecord>) -> MonitorResult {
        self.record(
            MonitorEvent::TabSwitched,
            format!("{}:{}", tab.id(), id_or_dash(previous)),
        )
    }

    fn on_tab_closing(&mut self, tab: &TabRecord) -> MonitorResult {
        self.record(MonitorEvent::TabClosing, tab.id().to_string())
    }

    fn on_tab_title_changed(&mut self, tab: &TabRecord) -> MonitorResult {
        self.record(
            MonitorEvent::TabTitleChanged,
            format!("{}:{}", tab.id(), tab.title),
        )
    }

    fn on_tab_persisting(&mut self, tab: &TabRecord) -> MonitorResult<Option<Value>> {
        self.record(MonitorEvent::TabPersisting, tab.id().to_string())?;
        Ok(self.persist_state.then(|| json!({ "seen": tab.id() })))
    }

    fn on_tab_restored(&mut self, tab: &TabRecord, state: &Value) -> MonitorResult {
        self.record(MonitorEvent::TabRestored, format!("{}:{}", tab.id(), state))
    }
}
