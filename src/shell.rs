//! Composition root of the daemon.
//!
//! [`Shell`] owns the [`MonitorRegistry`], the [`FocusEventListener`] and the
//! [`CommandRouter`], and runs the UI loop that ties them together: requests
//! from the shortcut transport are routed as they arrive, and focus events
//! queued by the listener thread are redelivered into the registry between
//! requests.

use crate::command::{FocusEvent, Monitor};
use crate::hyprland::events::FocusEventListener;
use crate::registry::{MonitorInstanceSet, MonitorRegistry};
use crate::router::CommandRouter;
use crate::traits::Request;
use crate::ui::headless::{HeadlessBar, HeadlessCorners, HeadlessDock, HeadlessNotch};
use log::{debug, info, warn};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

/// Registry, listener and router wired together on the UI thread.
pub struct Shell {
    registry: Rc<RefCell<MonitorRegistry>>,
    listener: FocusEventListener,
    router: CommandRouter,
    poll_interval: Duration,
    listener_down_reported: bool,
}

impl Shell {
    /// Take ownership of `registry` and `listener` and start listening.
    ///
    /// A listener that cannot connect is logged and left stopped; the shell
    /// still routes shortcuts, it just no longer follows focus.
    pub fn new(registry: MonitorRegistry, mut listener: FocusEventListener, poll_interval: Duration) -> Self {
        if let Err(e) = listener.start_listening() {
            warn!("focus tracking unavailable: {}", e);
        }
        let registry = Rc::new(RefCell::new(registry));
        let router = CommandRouter::new(registry.clone());
        Self {
            registry,
            listener,
            router,
            poll_interval,
            listener_down_reported: false,
        }
    }

    pub fn registry(&self) -> &Rc<RefCell<MonitorRegistry>> {
        &self.registry
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn listener(&self) -> &FocusEventListener {
        &self.listener
    }

    /// Register UI instances on every selected monitor.
    ///
    /// `make` builds the bar, notch and dock of one monitor.  `corners` is
    /// attached to monitor `0` only, and only if that monitor is selected.
    /// Returns the ids that received instances.
    pub fn register_instances<F>(
        &self,
        selected: &[String],
        mut make: F,
        corners: Option<Rc<dyn Any>>,
    ) -> Vec<usize>
    where
        F: FnMut(&Monitor) -> MonitorInstanceSet,
    {
        let monitors = self.registry.borrow().get_monitors();
        let mut registry = self.registry.borrow_mut();
        let mut ids = Vec::new();
        for monitor in select_monitors(&monitors, selected) {
            let mut set = make(&monitor);
            if monitor.id == 0 {
                if let Some(corners) = corners.clone() {
                    set = set.with_corners(corners);
                }
            }
            registry.register_monitor_instances(monitor.id, set);
            ids.push(monitor.id);
        }
        info!("registered UI instances on monitors {:?}", ids);
        ids
    }

    /// [`register_instances`](Self::register_instances) with the headless
    /// implementations.
    pub fn register_headless_instances(&self, selected: &[String]) -> Vec<usize> {
        self.register_instances(
            selected,
            |m| {
                MonitorInstanceSet::default()
                    .with_bar(Rc::new(HeadlessBar::new(m.id)))
                    .with_notch(Rc::new(HeadlessNotch::new(m.id)))
                    .with_dock(Rc::new(HeadlessDock::new(m.id)))
            },
            Some(Rc::new(HeadlessCorners)),
        )
    }

    /// Redeliver every queued focus event, oldest first.  Returns how many
    /// were processed.
    pub fn drain_focus_events(&self) -> usize {
        let events = self.listener.drain();
        for event in &events {
            match event {
                FocusEvent::MonitorFocused {
                    monitor_name,
                    workspace_id,
                } => match self.registry.try_borrow_mut() {
                    Ok(mut registry) => registry.on_monitor_focused(monitor_name, *workspace_id),
                    Err(_) => warn!("registry busy, dropping focus change to {}", monitor_name),
                },
                FocusEvent::WorkspaceChanged { workspace_id } => {
                    debug!("workspace {} active", workspace_id);
                }
            }
        }
        events.len()
    }

    /// Route one request and answer it.
    pub fn handle(&self, request: Request) -> bool {
        debug!("handling {}", request.action);
        let ok = self.router.dispatch(&request.action);
        // The requester may have given up waiting.
        let _ = request.reply.send(ok);
        ok
    }

    /// Run the UI loop until every request sender is gone.
    pub fn run(&mut self, requests: mpsc::Receiver<Request>) {
        info!("hyprnotch running");
        loop {
            match requests.recv_timeout(self.poll_interval) {
                Ok(request) => {
                    // Route against the focus as of now, not as of the last tick.
                    self.drain_focus_events();
                    self.handle(request);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
            self.drain_focus_events();
            self.check_listener();
        }
        info!("all request sources closed, exiting");
        self.listener.stop_listening();
    }

    fn check_listener(&mut self) {
        if self.listener.is_listening() {
            self.listener_down_reported = false;
        } else if !self.listener_down_reported {
            warn!("focus listener is not running; notch will not follow focus");
            self.listener_down_reported = true;
        }
    }
}

/// The monitors that receive UI instances.
///
/// An empty selection means all monitors, and so does a selection matching
/// none of them.
pub fn select_monitors(monitors: &[Monitor], selected: &[String]) -> Vec<Monitor> {
    if selected.is_empty() {
        return monitors.to_vec();
    }
    let chosen: Vec<Monitor> = monitors
        .iter()
        .filter(|m| selected.iter().any(|s| s == &m.name))
        .cloned()
        .collect();
    if chosen.is_empty() {
        warn!(
            "none of the selected monitors {:?} exist, using all of them",
            selected
        );
        return monitors.to_vec();
    }
    chosen
}
