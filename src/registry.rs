//! The authoritative table of monitors, notch state and UI instances.
//!
//! [`MonitorRegistry`] lives on the UI thread.  It is refreshed from a
//! [`MonitorQuery`], follows focus changes redelivered from the
//! [`FocusEventListener`](crate::hyprland::events::FocusEventListener), and
//! enforces the one-open-notch invariant together with the
//! [`CommandRouter`](crate::router::CommandRouter).
//!
//! The only piece of registry state that leaves the UI thread is the
//! [`MonitorDirectory`], a snapshot of the monitor table the listener
//! thread reads.

use crate::command::{Monitor, Role};
use crate::traits::{BarLike, DockLike, MonitorQuery, NotchLike};
use crate::workspace;
use log::{debug, info, warn};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::{mpsc, Arc, RwLock, RwLockReadGuard};

/// Overlay state of one monitor's notch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotchState {
    pub open: bool,
    /// Module shown while open; always `None` when closed.
    pub active_module: Option<String>,
}

/// UI handles registered for one monitor, one slot per [`Role`].
///
/// Every slot is optional; a missing instance turns the corresponding
/// operation into a no-op.
#[derive(Clone, Default)]
pub struct MonitorInstanceSet {
    pub bar: Option<Rc<dyn BarLike>>,
    pub notch: Option<Rc<dyn NotchLike>>,
    pub dock: Option<Rc<dyn DockLike>>,
    /// Screen corners are drawn once and shared; only monitor `0` carries
    /// them.  The registry never calls into them.
    pub corners: Option<Rc<dyn Any>>,
}

impl MonitorInstanceSet {
    pub fn with_bar(mut self, bar: Rc<dyn BarLike>) -> Self {
        self.bar = Some(bar);
        self
    }

    pub fn with_notch(mut self, notch: Rc<dyn NotchLike>) -> Self {
        self.notch = Some(notch);
        self
    }

    pub fn with_dock(mut self, dock: Rc<dyn DockLike>) -> Self {
        self.dock = Some(dock);
        self
    }

    pub fn with_corners(mut self, corners: Rc<dyn Any>) -> Self {
        self.corners = Some(corners);
        self
    }

    /// Look up the instance registered for `role`.
    pub fn get(&self, role: Role) -> Option<Instance> {
        match role {
            Role::Bar => self.bar.clone().map(Instance::Bar),
            Role::Notch => self.notch.clone().map(Instance::Notch),
            Role::Dock => self.dock.clone().map(Instance::Dock),
            Role::Corners => self.corners.clone().map(Instance::Corners),
        }
    }
}

/// A UI handle of any role.
#[derive(Clone)]
pub enum Instance {
    Bar(Rc<dyn BarLike>),
    Notch(Rc<dyn NotchLike>),
    Dock(Rc<dyn DockLike>),
    Corners(Rc<dyn Any>),
}

impl Instance {
    pub fn role(&self) -> Role {
        match self {
            Instance::Bar(_) => Role::Bar,
            Instance::Notch(_) => Role::Notch,
            Instance::Dock(_) => Role::Dock,
            Instance::Corners(_) => Role::Corners,
        }
    }
}

/// Notifications emitted by the registry to its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// The monitor table was rebuilt by [`MonitorRegistry::refresh`].
    MonitorsChanged(Vec<Monitor>),
    /// Focus moved from monitor `old` to monitor `new`.
    NotchFocusChanged { old: usize, new: usize },
}

/// Thread-safe snapshot of the current monitor table.
///
/// Cloning is cheap; every clone sees the latest [`MonitorRegistry::refresh`].
#[derive(Debug, Clone, Default)]
pub struct MonitorDirectory {
    inner: Arc<RwLock<DirectoryTable>>,
}

#[derive(Debug, Default)]
struct DirectoryTable {
    ids: HashMap<String, usize>,
    monitors: Vec<Monitor>,
}

impl MonitorDirectory {
    fn read(&self) -> RwLockReadGuard<'_, DirectoryTable> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Id of the monitor called `name`, if it is known.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.read().ids.get(name).copied()
    }

    /// Copy of the name → id table.
    pub fn snapshot(&self) -> HashMap<String, usize> {
        self.read().ids.clone()
    }

    /// The monitor with id `id` as of the last refresh.
    pub fn monitor(&self, id: usize) -> Option<Monitor> {
        self.read().monitors.iter().find(|m| m.id == id).cloned()
    }

    fn replace(&self, monitors: &[Monitor]) {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        table.ids = monitors.iter().map(|m| (m.name.clone(), m.id)).collect();
        table.monitors = monitors.to_vec();
    }
}

/// Monitor table, per-monitor notch state and UI instances.
///
/// # Typical usage
///
/// ```ignore
/// let mut registry = MonitorRegistry::new(Box::new(HyprctlQuery::new()), None);
/// registry.register_monitor_instances(0, instances);
/// registry.on_monitor_focused("DP-2", 11);
/// ```
pub struct MonitorRegistry {
    query: Box<dyn MonitorQuery>,
    fallback: Option<Box<dyn MonitorQuery>>,
    monitors: Vec<Monitor>,
    focused_id: usize,
    notch_states: BTreeMap<usize, NotchState>,
    instances: BTreeMap<usize, MonitorInstanceSet>,
    name_cache: HashMap<String, usize>,
    directory: MonitorDirectory,
    observers: Vec<mpsc::Sender<RegistryEvent>>,
}

impl MonitorRegistry {
    /// Create a registry and populate it with an initial [`refresh`](Self::refresh).
    ///
    /// `query` is asked first (normally the compositor); `fallback` is only
    /// consulted when it fails.
    pub fn new(query: Box<dyn MonitorQuery>, fallback: Option<Box<dyn MonitorQuery>>) -> Self {
        let mut registry = Self {
            query,
            fallback,
            monitors: Vec::new(),
            focused_id: 0,
            notch_states: BTreeMap::new(),
            instances: BTreeMap::new(),
            name_cache: HashMap::new(),
            directory: MonitorDirectory::default(),
            observers: Vec::new(),
        };
        registry.refresh();
        registry
    }

    /// Subscribe to [`RegistryEvent`]s.
    ///
    /// Observers whose receiver has been dropped are forgotten on the next
    /// emission.
    pub fn add_observer(&mut self, tx: mpsc::Sender<RegistryEvent>) {
        self.observers.push(tx);
    }

    /// The shared monitor snapshot for consumers off the UI thread.
    pub fn directory(&self) -> MonitorDirectory {
        self.directory.clone()
    }

    //  Monitor table

    /// Rebuild the monitor table.
    ///
    /// Ids are assigned `0..N` in query order.  When the primary query fails
    /// the fallback enumeration is used (first monitor assumed focused);
    /// when that fails too, a single default monitor is synthesised.  The
    /// result always holds at least one monitor and exactly one of them is
    /// marked focused.  If no source reports a focused monitor, the previous
    /// focus id is kept.
    pub fn refresh(&mut self) -> Vec<Monitor> {
        let mut monitors = match self.query.monitors() {
            Ok(list) if !list.is_empty() => list
                .into_iter()
                .enumerate()
                .map(|(id, info)| Monitor::from_info(id, info))
                .collect(),
            Ok(_) => {
                warn!("compositor reported no monitors, trying fallback");
                self.fallback_monitors()
            }
            Err(e) => {
                warn!("{}, trying fallback", e);
                self.fallback_monitors()
            }
        };

        if monitors.is_empty() {
            warn!("no monitor source available, using a default monitor");
            monitors.push(Monitor::synthetic_default());
        }

        if let Some(m) = monitors.iter().find(|m| m.focused) {
            self.focused_id = m.id;
        } else if self.focused_id >= monitors.len() {
            // The retained id no longer exists.
            self.focused_id = 0;
        }
        for m in &mut monitors {
            m.focused = m.id == self.focused_id;
            self.notch_states.entry(m.id).or_default();
        }

        info!(
            "monitors: {} (focused: {})",
            monitors
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            self.focused_id
        );

        self.monitors = monitors;
        self.resync_name_cache();
        self.directory.replace(&self.monitors);
        self.emit(RegistryEvent::MonitorsChanged(self.monitors.clone()));
        self.monitors.clone()
    }

    fn fallback_monitors(&self) -> Vec<Monitor> {
        let Some(fallback) = &self.fallback else {
            return Vec::new();
        };
        match fallback.monitors() {
            Ok(list) => list
                .into_iter()
                .enumerate()
                .map(|(id, info)| Monitor {
                    focused: id == 0,
                    ..Monitor::from_info(id, info)
                })
                .collect(),
            Err(e) => {
                warn!("fallback {}", e);
                Vec::new()
            }
        }
    }

    fn resync_name_cache(&mut self) {
        self.name_cache = self
            .monitors
            .iter()
            .map(|m| (m.name.clone(), m.id))
            .collect();
    }

    /// Snapshot of every known monitor.
    pub fn get_monitors(&self) -> Vec<Monitor> {
        self.monitors.clone()
    }

    pub fn get_monitor_by_id(&self, id: usize) -> Option<Monitor> {
        self.monitors.iter().find(|m| m.id == id).cloned()
    }

    pub fn get_focused_monitor_id(&self) -> usize {
        self.focused_id
    }

    pub fn get_focused_monitor(&self) -> Option<Monitor> {
        self.get_monitor_by_id(self.focused_id)
    }

    /// Scale factor of monitor `id`, `1.0` if it is unknown.
    pub fn get_monitor_scale(&self, id: usize) -> f64 {
        self.get_monitor_by_id(id).map(|m| m.scale).unwrap_or(1.0)
    }

    pub fn workspace_range_for_monitor(&self, id: usize) -> (i32, i32) {
        workspace::workspace_range_for_monitor(id)
    }

    pub fn monitor_for_workspace(&self, workspace_id: i32) -> usize {
        workspace::monitor_for_workspace(workspace_id)
    }

    //  Notch state

    pub fn is_notch_open(&self, id: usize) -> bool {
        self.notch_states.get(&id).map(|s| s.open).unwrap_or(false)
    }

    /// Record the notch state of monitor `id`.
    ///
    /// No invariant is checked here; callers close the other notches first.
    /// The module is only kept while the notch is open.
    pub fn set_notch_state(&mut self, id: usize, open: bool, module: Option<&str>) {
        let state = self.notch_states.entry(id).or_default();
        state.open = open;
        state.active_module = if open { module.map(str::to_owned) } else { None };
    }

    /// Module recorded for the notch of monitor `id`.
    pub fn get_current_notch_module(&self, id: usize) -> Option<&str> {
        self.notch_states
            .get(&id)
            .and_then(|s| s.active_module.as_deref())
    }

    pub fn active_module(&self, id: usize) -> Option<&str> {
        self.get_current_notch_module(id)
    }

    pub fn notch_state(&self, id: usize) -> NotchState {
        self.notch_states.get(&id).cloned().unwrap_or_default()
    }

    /// Close every open notch except the one on `keep_id`.
    pub fn close_all_notches_except(&mut self, keep_id: usize) {
        self.close_notches(Some(keep_id));
    }

    /// Close every open notch.
    pub fn close_all_notches(&mut self) {
        self.close_notches(None);
    }

    fn close_notches(&mut self, keep: Option<usize>) {
        let open: Vec<usize> = self
            .notch_states
            .iter()
            .filter(|(id, state)| state.open && Some(**id) != keep)
            .map(|(id, _)| *id)
            .collect();

        for id in open {
            self.set_notch_state(id, false, None);
            if let Some(notch) = self.notch(id) {
                debug!("closing notch on monitor {}", id);
                if let Err(e) = notch.close() {
                    warn!("closing notch on monitor {} failed: {}", id, e);
                }
            }
        }
    }

    //  Instances

    /// Register the UI handles of monitor `id`, replacing earlier ones.
    pub fn register_monitor_instances(&mut self, id: usize, instances: MonitorInstanceSet) {
        self.instances.insert(id, instances);
    }

    pub fn get_monitor_instances(&self, id: usize) -> Option<&MonitorInstanceSet> {
        self.instances.get(&id)
    }

    pub fn get_instance(&self, id: usize, role: Role) -> Option<Instance> {
        self.instances.get(&id).and_then(|set| set.get(role))
    }

    pub fn get_focused_instance(&self, role: Role) -> Option<Instance> {
        self.get_instance(self.focused_id, role)
    }

    pub fn notch(&self, id: usize) -> Option<Rc<dyn NotchLike>> {
        self.instances.get(&id).and_then(|set| set.notch.clone())
    }

    pub fn bar(&self, id: usize) -> Option<Rc<dyn BarLike>> {
        self.instances.get(&id).and_then(|set| set.bar.clone())
    }

    pub fn dock(&self, id: usize) -> Option<Rc<dyn DockLike>> {
        self.instances.get(&id).and_then(|set| set.dock.clone())
    }

    /// Every registered dock, in monitor order.
    pub fn docks(&self) -> Vec<Rc<dyn DockLike>> {
        self.instances
            .values()
            .filter_map(|set| set.dock.clone())
            .collect()
    }

    //  Focus

    /// React to the compositor focusing monitor `name`.
    ///
    /// When focus actually moves and the old monitor's notch was open, the
    /// overlay follows: every notch is closed and the same module is opened
    /// on the new monitor.  Unknown names are ignored.
    pub fn on_monitor_focused(&mut self, name: &str, workspace_id: i32) {
        let Some(new_id) = self.resolve_monitor_id(name) else {
            warn!("focus moved to unknown monitor {:?}, ignoring", name);
            return;
        };
        debug!(
            "monitor {} (id {}) focused, workspace {}",
            name, new_id, workspace_id
        );

        let old_id = self.focused_id;
        if new_id == old_id {
            return;
        }
        self.set_focused(new_id);

        if self.is_notch_open(old_id) {
            self.migrate_notch(old_id, new_id);
        }

        self.emit(RegistryEvent::NotchFocusChanged {
            old: old_id,
            new: new_id,
        });
    }

    fn resolve_monitor_id(&mut self, name: &str) -> Option<usize> {
        if let Some(id) = self.name_cache.get(name) {
            return Some(*id);
        }
        self.resync_name_cache();
        self.name_cache.get(name).copied()
    }

    fn set_focused(&mut self, id: usize) {
        self.focused_id = id;
        for m in &mut self.monitors {
            m.focused = m.id == id;
        }
    }

    fn migrate_notch(&mut self, old_id: usize, new_id: usize) {
        let module = self.get_current_notch_module(old_id).map(str::to_owned);
        self.close_all_notches();

        let Some(notch) = self.notch(new_id) else {
            debug!("no notch on monitor {}, overlay stays closed", new_id);
            return;
        };
        let result = match &module {
            Some(m) => notch.open_module(m),
            None => notch.open(),
        };
        match result {
            Ok(()) => {
                info!(
                    "notch follows focus: {} -> {} ({})",
                    old_id,
                    new_id,
                    module.as_deref().unwrap_or("no module")
                );
                self.set_notch_state(new_id, true, module.as_deref());
            }
            Err(e) => warn!("reopening notch on monitor {} failed: {}", new_id, e),
        }
    }

    fn emit(&mut self, event: RegistryEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
