//! Routes shortcut actions to the focused monitor.
//!
//! [`CommandRouter`] holds no state of its own.  Every action looks up the
//! focused monitor in the [`MonitorRegistry`], resolves the UI instances it
//! needs, calls them and updates the notch bookkeeping.  Actions report
//! success as a `bool`; a missing registry, a missing instance or a failing
//! UI call all come back as `false` and a log line, never as a panic.

use crate::command::{Action, Monitor, Role};
use crate::registry::MonitorRegistry;
use crate::traits::{NotchLike, UiError};
use log::{debug, info, warn};
use std::cell::{RefCell, RefMut};
use std::rc::Rc;

/// Why an action did nothing.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("no monitor registry configured")]
    NoRegistry,
    /// The registry is already borrowed further up the call stack.
    #[error("monitor registry is busy")]
    RegistryBusy,
    #[error("no {role} registered on monitor {monitor}")]
    MissingInstance { monitor: usize, role: Role },
    #[error(transparent)]
    Ui(#[from] UiError),
}

/// Stateless facade dispatching actions to the focused monitor.
#[derive(Default, Clone)]
pub struct CommandRouter {
    registry: Option<Rc<RefCell<MonitorRegistry>>>,
}

impl CommandRouter {
    pub fn new(registry: Rc<RefCell<MonitorRegistry>>) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn set_registry(&mut self, registry: Rc<RefCell<MonitorRegistry>>) {
        self.registry = Some(registry);
    }

    fn registry(&self) -> Result<RefMut<'_, MonitorRegistry>, RouterError> {
        let registry = self.registry.as_ref().ok_or(RouterError::NoRegistry)?;
        registry
            .try_borrow_mut()
            .map_err(|_| RouterError::RegistryBusy)
    }

    fn report(what: &str, result: Result<(), RouterError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("{} did nothing: {}", what, e);
                false
            }
        }
    }

    /// Run a parsed [`Action`].
    pub fn dispatch(&self, action: &Action) -> bool {
        debug!("dispatching {:?}", action);
        match action {
            Action::ToggleNotch => self.toggle_notch(),
            Action::ToggleBar => self.toggle_bar(),
            _ => action
                .module()
                .map(|module| self.open_notch_module(module))
                .unwrap_or(false),
        }
    }

    pub fn open_launcher(&self) -> bool {
        self.dispatch(&Action::OpenLauncher)
    }

    pub fn open_overview(&self) -> bool {
        self.dispatch(&Action::OpenOverview)
    }

    pub fn open_dashboard(&self) -> bool {
        self.dispatch(&Action::OpenDashboard)
    }

    pub fn open_power_menu(&self) -> bool {
        self.dispatch(&Action::OpenPowerMenu)
    }

    pub fn open_toolbox(&self) -> bool {
        self.dispatch(&Action::OpenToolbox)
    }

    pub fn open_emoji_picker(&self) -> bool {
        self.dispatch(&Action::OpenEmojiPicker)
    }

    pub fn open_clipboard_history(&self) -> bool {
        self.dispatch(&Action::OpenClipboardHistory)
    }

    //  Notch

    /// Open `module` in the focused monitor's notch.
    ///
    /// Every other notch is closed first, so at most one stays open.
    pub fn open_notch_module(&self, module: &str) -> bool {
        Self::report(
            &format!("opening {}", module),
            self.try_open_notch_module(module),
        )
    }

    fn try_open_notch_module(&self, module: &str) -> Result<(), RouterError> {
        let mut registry = self.registry()?;
        let focused = registry.get_focused_monitor_id();
        registry.close_all_notches_except(focused);

        let notch = focused_notch(&registry, focused)?;
        notch.open_module(module)?;
        registry.set_notch_state(focused, true, Some(module));
        info!("opened {} on monitor {}", module, focused);
        Ok(())
    }

    /// Open or close the focused monitor's notch.
    pub fn toggle_notch(&self) -> bool {
        Self::report("toggling notch", self.try_toggle_notch())
    }

    fn try_toggle_notch(&self) -> Result<(), RouterError> {
        let mut registry = self.registry()?;
        let focused = registry.get_focused_monitor_id();
        let notch = focused_notch(&registry, focused)?;

        if registry.is_notch_open(focused) {
            notch.close()?;
            registry.set_notch_state(focused, false, None);
            info!("closed notch on monitor {}", focused);
        } else {
            registry.close_all_notches_except(focused);
            notch.open()?;
            registry.set_notch_state(focused, true, None);
            info!("opened notch on monitor {}", focused);
        }
        Ok(())
    }

    //  Bar

    /// Show or hide the focused monitor's bar.
    ///
    /// Hiding the bar pushes the focused notch and the docks of **all**
    /// monitors into occlusion; showing it restores them.
    pub fn toggle_bar(&self) -> bool {
        Self::report("toggling bar", self.try_toggle_bar())
    }

    fn try_toggle_bar(&self) -> Result<(), RouterError> {
        let registry = self.registry()?;
        let focused = registry.get_focused_monitor_id();
        let bar = registry.bar(focused).ok_or(RouterError::MissingInstance {
            monitor: focused,
            role: Role::Bar,
        })?;
        let notch = focused_notch(&registry, focused)?;

        let was_visible = bar.get_visible();
        bar.set_visible(!was_visible)?;

        if was_visible {
            notch.force_occlusion()?;
            for dock in registry.docks() {
                if let Err(e) = dock.force_occlusion() {
                    warn!("dock occlusion failed: {}", e);
                }
            }
            info!("bar hidden on monitor {}", focused);
        } else {
            notch.restore_from_occlusion()?;
            for dock in registry.docks() {
                if let Err(e) = dock.restore_from_occlusion() {
                    warn!("dock restore failed: {}", e);
                }
            }
            info!("bar shown on monitor {}", focused);
        }
        Ok(())
    }

    //  Queries

    /// The focused monitor, if a registry is configured.
    pub fn focused_monitor_info(&self) -> Option<Monitor> {
        let registry = self.registry.as_ref()?.try_borrow().ok()?;
        registry.get_focused_monitor()
    }

    /// Every known monitor; empty without a registry.
    pub fn all_monitors_info(&self) -> Vec<Monitor> {
        self.registry
            .as_ref()
            .and_then(|r| r.try_borrow().ok())
            .map(|r| r.get_monitors())
            .unwrap_or_default()
    }
}

fn focused_notch(
    registry: &MonitorRegistry,
    focused: usize,
) -> Result<Rc<dyn NotchLike>, RouterError> {
    registry.notch(focused).ok_or(RouterError::MissingInstance {
        monitor: focused,
        role: Role::Notch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MonitorInstanceSet;
    use crate::testing::{call_log, info, probe_bar, probe_notch, probe_set, CallLog, ScriptedQuery};

    fn two_monitor_router(log: &CallLog) -> (CommandRouter, Rc<RefCell<MonitorRegistry>>) {
        let q = ScriptedQuery::ok(vec![info("DP-1", true), info("HDMI-A-1", false)]);
        let mut registry = MonitorRegistry::new(Box::new(q), None);
        registry.register_monitor_instances(0, probe_set(0, log));
        registry.register_monitor_instances(1, probe_set(1, log));
        let registry = Rc::new(RefCell::new(registry));
        (CommandRouter::new(registry.clone()), registry)
    }

    fn open_count(registry: &Rc<RefCell<MonitorRegistry>>) -> usize {
        let r = registry.borrow();
        r.get_monitors()
            .iter()
            .filter(|m| r.is_notch_open(m.id))
            .count()
    }

    #[test]
    fn actions_without_registry_return_false() {
        let router = CommandRouter::default();
        assert!(!router.open_launcher());
        assert!(!router.open_overview());
        assert!(!router.toggle_notch());
        assert!(!router.toggle_bar());
        assert!(router.focused_monitor_info().is_none());
        assert!(router.all_monitors_info().is_empty());
    }

    #[test]
    fn open_launcher_on_focused_monitor() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);

        assert!(router.open_notch_module("launcher"));

        let r = registry.borrow();
        assert!(r.is_notch_open(0));
        assert_eq!(r.active_module(0), Some("launcher"));
        assert!(!r.is_notch_open(1));
        assert_eq!(*log.borrow(), vec!["notch0:open_module:launcher"]);
    }

    #[test]
    fn open_notch_follows_focus_event() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        assert!(router.open_launcher());

        registry.borrow_mut().on_monitor_focused("HDMI-A-1", 11);

        let r = registry.borrow();
        assert!(!r.is_notch_open(0));
        assert!(r.is_notch_open(1));
        assert_eq!(r.get_current_notch_module(1), Some("launcher"));
        assert_eq!(
            *log.borrow(),
            vec![
                "notch0:open_module:launcher",
                "notch0:close",
                "notch1:open_module:launcher"
            ]
        );
    }

    #[test]
    fn at_most_one_notch_open_across_actions() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);

        router.open_dashboard();
        assert!(open_count(&registry) <= 1);
        registry.borrow_mut().on_monitor_focused("HDMI-A-1", 11);
        assert!(open_count(&registry) <= 1);
        router.open_power_menu();
        assert!(open_count(&registry) <= 1);

        // A stale record on another monitor is repaired by the next open.
        registry.borrow_mut().set_notch_state(0, true, Some("stale"));
        router.open_toolbox();
        assert_eq!(open_count(&registry), 1);

        registry.borrow_mut().on_monitor_focused("DP-1", 2);
        assert!(open_count(&registry) <= 1);
        router.toggle_notch();
        assert!(open_count(&registry) <= 1);
        router.open_emoji_picker();
        assert_eq!(open_count(&registry), 1);
        assert!(registry.borrow().is_notch_open(0));
    }

    #[test]
    fn open_closes_other_notch_first() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        registry.borrow_mut().set_notch_state(1, true, Some("overview"));

        assert!(router.open_clipboard_history());

        assert_eq!(
            *log.borrow(),
            vec!["notch1:close", "notch0:open_module:cliphist"]
        );
        assert_eq!(open_count(&registry), 1);
    }

    #[test]
    fn missing_notch_returns_false() {
        let q = ScriptedQuery::ok(vec![info("DP-1", true)]);
        let registry = Rc::new(RefCell::new(MonitorRegistry::new(Box::new(q), None)));
        let router = CommandRouter::new(registry.clone());
        assert!(!router.open_launcher());
        assert!(!router.toggle_notch());
        assert!(!registry.borrow().is_notch_open(0));
    }

    #[test]
    fn failing_open_returns_false_and_records_nothing() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        let notch = probe_notch(0, &log);
        notch.fail.set(true);
        registry
            .borrow_mut()
            .register_monitor_instances(0, MonitorInstanceSet::default().with_notch(notch));

        assert!(!router.open_overview());
        assert!(!registry.borrow().is_notch_open(0));
    }

    #[test]
    fn busy_registry_returns_false() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        let _held = registry.borrow_mut();
        assert!(!router.open_launcher());
    }

    #[test]
    fn dispatch_maps_actions_to_modules() {
        let cases = [
            (Action::OpenLauncher, "launcher"),
            (Action::OpenOverview, "overview"),
            (Action::OpenDashboard, "dashboard"),
            (Action::OpenPowerMenu, "power"),
            (Action::OpenToolbox, "tools"),
            (Action::OpenEmojiPicker, "emoji"),
            (Action::OpenClipboardHistory, "cliphist"),
            (Action::OpenNotchModule("kanban".into()), "kanban"),
        ];
        for (action, module) in cases {
            let log = call_log();
            let (router, registry) = two_monitor_router(&log);
            assert!(router.dispatch(&action));
            assert_eq!(registry.borrow().get_current_notch_module(0), Some(module));
        }
    }

    #[test]
    fn toggle_notch_opens_then_closes() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);

        assert!(router.toggle_notch());
        assert!(registry.borrow().is_notch_open(0));
        assert_eq!(registry.borrow().get_current_notch_module(0), None);

        assert!(router.toggle_notch());
        assert!(!registry.borrow().is_notch_open(0));
        assert_eq!(*log.borrow(), vec!["notch0:open", "notch0:close"]);
    }

    #[test]
    fn toggle_bar_hides_and_occludes_everywhere() {
        let log = call_log();
        let (router, _registry) = two_monitor_router(&log);

        assert!(router.toggle_bar());

        assert_eq!(
            *log.borrow(),
            vec![
                "bar0:set_visible:false",
                "notch0:force_occlusion",
                "dock0:force_occlusion",
                "dock1:force_occlusion"
            ]
        );
    }

    #[test]
    fn toggle_bar_twice_restores() {
        let log = call_log();
        let (router, _registry) = two_monitor_router(&log);
        assert!(router.toggle_bar());
        log.borrow_mut().clear();

        assert!(router.toggle_bar());

        assert_eq!(
            *log.borrow(),
            vec![
                "bar0:set_visible:true",
                "notch0:restore_from_occlusion",
                "dock0:restore_from_occlusion",
                "dock1:restore_from_occlusion"
            ]
        );
    }

    #[test]
    fn toggle_bar_is_scoped_to_focused_bar() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        registry.borrow_mut().on_monitor_focused("HDMI-A-1", 11);

        assert!(router.toggle_bar());

        let entries = log.borrow();
        assert!(entries.contains(&"bar1:set_visible:false".to_string()));
        assert!(entries.contains(&"notch1:force_occlusion".to_string()));
        assert!(!entries.iter().any(|e| e.starts_with("bar0") || e.starts_with("notch0")));
    }

    #[test]
    fn toggle_bar_without_bar_returns_false() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        registry.borrow_mut().register_monitor_instances(
            0,
            MonitorInstanceSet::default().with_notch(probe_notch(0, &log)),
        );
        assert!(!router.toggle_bar());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn toggle_bar_without_notch_returns_false() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        let bar = probe_bar(0, &log);
        registry
            .borrow_mut()
            .register_monitor_instances(0, MonitorInstanceSet::default().with_bar(bar.clone()));
        assert!(!router.toggle_bar());
        assert!(bar.visible.get());
    }

    #[test]
    fn monitor_queries() {
        let log = call_log();
        let (router, registry) = two_monitor_router(&log);
        assert_eq!(router.focused_monitor_info().map(|m| m.name), Some("DP-1".into()));
        registry.borrow_mut().on_monitor_focused("HDMI-A-1", 11);
        assert_eq!(
            router.focused_monitor_info().map(|m| m.name),
            Some("HDMI-A-1".into())
        );
        assert_eq!(router.all_monitors_info().len(), 2);
    }
}
