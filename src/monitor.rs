//! Tab monitors: observers of every tab lifecycle event.
//!
//! [`MonitorBus`] fans each event out to all registered monitors in
//! registration order, synchronously, before the triggering engine call
//! returns. A monitor that fails is logged and recorded, and delivery carries
//! on with the next one.

use crate::error::MonitorNotificationFailure;
use crate::tab::TabRecord;
use serde_json::Value;
use std::fmt;

/// Result type for monitor callbacks.
pub type MonitorResult<T = ()> = anyhow::Result<T>;

/// Identity of a registered monitor.
pub type MonitorId = u64;

/// Lifecycle events delivered to monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorEvent {
    TabOpened,
    TabSwitched,
    TabClosing,
    TabTitleChanged,
    TabPersisting,
    TabRestored,
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MonitorEvent::TabOpened => "tab_opened",
            MonitorEvent::TabSwitched => "tab_switched",
            MonitorEvent::TabClosing => "tab_closing",
            MonitorEvent::TabTitleChanged => "tab_title_changed",
            MonitorEvent::TabPersisting => "tab_persisting",
            MonitorEvent::TabRestored => "tab_restored",
        };
        f.write_str(name)
    }
}

/// An observer of tab lifecycle events, independent of any provider.
///
/// Every callback has a no-op default so monitors implement only what they
/// care about.
pub trait TabMonitor {
    /// Name used in failure reports and as the key for per-monitor session state
    fn name(&self) -> &str;

    /// A tab was opened. `previous` is the tab selected at the time.
    fn on_tab_opened(
        &mut self,
        _tab: &TabRecord,
        _is_first: bool,
        _previous: Option<&TabRecord>,
    ) -> MonitorResult {
        Ok(())
    }

    /// Selection moved to `tab`. `previous` is `None` when the old tab closed.
    fn on_tab_switched(&mut self, _tab: &TabRecord, _previous: Option<&TabRecord>) -> MonitorResult {
        Ok(())
    }

    /// A tab is about to be removed.
    fn on_tab_closing(&mut self, _tab: &TabRecord) -> MonitorResult {
        Ok(())
    }

    /// A tab's title changed.
    fn on_tab_title_changed(&mut self, _tab: &TabRecord) -> MonitorResult {
        Ok(())
    }

    /// A tab is being persisted; return state to store alongside it.
    fn on_tab_persisting(&mut self, _tab: &TabRecord) -> MonitorResult<Option<Value>> {
        Ok(None)
    }

    /// A tab was restored; `state` is what `on_tab_persisting` returned for it.
    fn on_tab_restored(&mut self, _tab: &TabRecord, _state: &Value) -> MonitorResult {
        Ok(())
    }
}

/// Insertion-ordered set of monitors.
#[derive(Default)]
pub struct MonitorBus {
    monitors: Vec<(MonitorId, Box<dyn TabMonitor>)>,
    next_id: MonitorId,
    failures: Vec<MonitorNotificationFailure>,
}

impl MonitorBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, monitor: Box<dyn TabMonitor>) -> MonitorId {
        self.next_id += 1;
        let id = self.next_id;
        log::debug!("Registered tab monitor '{}' as {}", monitor.name(), id);
        self.monitors.push((id, monitor));
        id
    }

    /// Remove a monitor, handing it back. Unknown ids return `None`.
    pub fn unregister(&mut self, id: MonitorId) -> Option<Box<dyn TabMonitor>> {
        let idx = self.monitors.iter().position(|(mid, _)| *mid == id)?;
        let (_, monitor) = self.monitors.remove(idx);
        log::debug!("Unregistered tab monitor '{}'", monitor.name());
        Some(monitor)
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Monitor names in delivery order
    pub fn names(&self) -> Vec<String> {
        self.monitors
            .iter()
            .map(|(_, m)| m.name().to_string())
            .collect()
    }

    /// Deliver an event to every monitor, isolating failures.
    pub fn notify(
        &mut self,
        event: MonitorEvent,
        mut deliver: impl FnMut(&mut dyn TabMonitor) -> MonitorResult,
    ) {
        for (_, monitor) in self.monitors.iter_mut() {
            if let Err(err) = deliver(monitor.as_mut()) {
                let failure = MonitorNotificationFailure {
                    monitor: monitor.name().to_string(),
                    event,
                    message: format!("{err:#}"),
                };
                log::warn!("{failure}");
                self.failures.push(failure);
            }
        }
    }

    /// Ask every monitor for its share of a tab's persisted state.
    ///
    /// Returns `(monitor name, state)` pairs for monitors that returned some.
    pub fn collect(
        &mut self,
        event: MonitorEvent,
        mut ask: impl FnMut(&mut dyn TabMonitor) -> MonitorResult<Option<Value>>,
    ) -> Vec<(String, Value)> {
        let mut collected = Vec::new();
        self.notify(event, |monitor| {
            if let Some(value) = ask(monitor)? {
                collected.push((monitor.name().to_string(), value));
            }
            Ok(())
        });
        collected
    }

    /// Drain the failures recorded since the last call
    pub fn take_failures(&mut self) -> Vec<MonitorNotificationFailure> {
        std::mem::take(&mut self.failures)
    }
}

impl fmt::Debug for MonitorBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorBus")
            .field("monitors", &self.names())
            .field("pending_failures", &self.failures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl TabMonitor for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_tab_closing(&mut self, tab: &TabRecord) -> MonitorResult {
            self.log.borrow_mut().push(format!("{}:{}", self.name, tab.id()));
            if self.fail {
                anyhow::bail!("refusing tab {}", tab.id());
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Rc<RefCell<Vec<String>>>, fail: bool) -> Box<Recorder> {
        Box::new(Recorder {
            name,
            log: Rc::clone(log),
            fail,
        })
    }

    #[test]
    fn delivers_in_registration_order_past_failures() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = MonitorBus::new();
        bus.register(recorder("a", &log, false));
        bus.register(recorder("b", &log, true));
        bus.register(recorder("c", &log, false));

        let tab = TabRecord::new_stub(5, "m");
        bus.notify(MonitorEvent::TabClosing, |m| m.on_tab_closing(&tab));

        assert_eq!(*log.borrow(), vec!["a:5", "b:5", "c:5"]);
        let failures = bus.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].monitor, "b");
        assert_eq!(failures[0].event, MonitorEvent::TabClosing);
        assert_eq!(failures[0].message, "refusing tab 5");
        assert!(bus.take_failures().is_empty());
    }

    #[test]
    fn unregister_by_identity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = MonitorBus::new();
        let a = bus.register(recorder("a", &log, false));
        bus.register(recorder("b", &log, false));

        assert_eq!(bus.unregister(a).map(|m| m.name().to_string()), Some("a".into()));
        assert!(bus.unregister(a).is_none());
        assert_eq!(bus.names(), vec!["b".to_string()]);
    }
}
