//! Recording test doubles shared by the unit tests.

use crate::command::MonitorInfo;
use crate::registry::MonitorInstanceSet;
use crate::traits::{BarLike, DockLike, MonitorQuery, NotchLike, QueryError, UiError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Chronological log of UI calls, shared across every probe of a test.
pub(crate) type CallLog = Rc<RefCell<Vec<String>>>;

pub(crate) fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn info(name: &str, focused: bool) -> MonitorInfo {
    MonitorInfo {
        name: name.into(),
        width: 1920,
        height: 1080,
        x: 0,
        y: 0,
        scale: 1.0,
        focused,
    }
}

/// A [`MonitorQuery`] whose answer can be swapped between refreshes.
#[derive(Clone)]
pub(crate) struct ScriptedQuery {
    pub(crate) result: Rc<RefCell<Result<Vec<MonitorInfo>, String>>>,
}

impl ScriptedQuery {
    pub(crate) fn ok(monitors: Vec<MonitorInfo>) -> Self {
        Self {
            result: Rc::new(RefCell::new(Ok(monitors))),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            result: Rc::new(RefCell::new(Err("scripted failure".into()))),
        }
    }

    pub(crate) fn set(&self, result: Result<Vec<MonitorInfo>, String>) {
        *self.result.borrow_mut() = result;
    }
}

impl MonitorQuery for ScriptedQuery {
    fn monitors(&self) -> Result<Vec<MonitorInfo>, QueryError> {
        self.result.borrow().clone().map_err(QueryError)
    }
}

pub(crate) struct ProbeNotch {
    pub(crate) monitor: usize,
    pub(crate) log: CallLog,
    pub(crate) fail: Cell<bool>,
}

impl ProbeNotch {
    fn record(&self, what: &str) -> Result<(), UiError> {
        if self.fail.get() {
            return Err(UiError(format!("notch{} refused {}", self.monitor, what)));
        }
        self.log
            .borrow_mut()
            .push(format!("notch{}:{}", self.monitor, what));
        Ok(())
    }
}

impl NotchLike for ProbeNotch {
    fn open_module(&self, module: &str) -> Result<(), UiError> {
        self.record(&format!("open_module:{}", module))
    }
    fn open(&self) -> Result<(), UiError> {
        self.record("open")
    }
    fn close(&self) -> Result<(), UiError> {
        self.record("close")
    }
    fn force_occlusion(&self) -> Result<(), UiError> {
        self.record("force_occlusion")
    }
    fn restore_from_occlusion(&self) -> Result<(), UiError> {
        self.record("restore_from_occlusion")
    }
}

pub(crate) struct ProbeBar {
    pub(crate) monitor: usize,
    pub(crate) log: CallLog,
    pub(crate) visible: Cell<bool>,
}

impl BarLike for ProbeBar {
    fn get_visible(&self) -> bool {
        self.visible.get()
    }
    fn set_visible(&self, visible: bool) -> Result<(), UiError> {
        self.visible.set(visible);
        self.log
            .borrow_mut()
            .push(format!("bar{}:set_visible:{}", self.monitor, visible));
        Ok(())
    }
}

pub(crate) struct ProbeDock {
    pub(crate) monitor: usize,
    pub(crate) log: CallLog,
}

impl DockLike for ProbeDock {
    fn force_occlusion(&self) -> Result<(), UiError> {
        self.log
            .borrow_mut()
            .push(format!("dock{}:force_occlusion", self.monitor));
        Ok(())
    }
    fn restore_from_occlusion(&self) -> Result<(), UiError> {
        self.log
            .borrow_mut()
            .push(format!("dock{}:restore_from_occlusion", self.monitor));
        Ok(())
    }
}

pub(crate) fn probe_notch(monitor: usize, log: &CallLog) -> Rc<ProbeNotch> {
    Rc::new(ProbeNotch {
        monitor,
        log: log.clone(),
        fail: Cell::new(false),
    })
}

pub(crate) fn probe_bar(monitor: usize, log: &CallLog) -> Rc<ProbeBar> {
    Rc::new(ProbeBar {
        monitor,
        log: log.clone(),
        visible: Cell::new(true),
    })
}

pub(crate) fn probe_dock(monitor: usize, log: &CallLog) -> Rc<ProbeDock> {
    Rc::new(ProbeDock {
        monitor,
        log: log.clone(),
    })
}

/// Bar, notch and dock probes for one monitor, all logging into `log`.
pub(crate) fn probe_set(monitor: usize, log: &CallLog) -> MonitorInstanceSet {
    MonitorInstanceSet::default()
        .with_bar(probe_bar(monitor, log))
        .with_notch(probe_notch(monitor, log))
        .with_dock(probe_dock(monitor, log))
}
