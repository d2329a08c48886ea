//! Headless UI instances.
//!
//! These implement the UI traits without drawing anything: they keep the
//! state a real widget would have and log every transition.  The daemon
//! registers them when no toolkit front-end is attached, which keeps the
//! focus and notch bookkeeping observable from the logs.

use crate::traits::{BarLike, DockLike, NotchLike, UiError};
use log::info;
use std::cell::{Cell, RefCell};

/// A notch that remembers whether it is open, what it shows and whether it
/// is occluded.
#[derive(Debug, Default)]
pub struct HeadlessNotch {
    monitor: usize,
    open: Cell<bool>,
    module: RefCell<Option<String>>,
    occluded: Cell<bool>,
}

impl HeadlessNotch {
    pub fn new(monitor: usize) -> Self {
        Self {
            monitor,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn module(&self) -> Option<String> {
        self.module.borrow().clone()
    }

    pub fn is_occluded(&self) -> bool {
        self.occluded.get()
    }
}

impl NotchLike for HeadlessNotch {
    fn open_module(&self, module: &str) -> Result<(), UiError> {
        info!("[notch {}] open {}", self.monitor, module);
        self.open.set(true);
        *self.module.borrow_mut() = Some(module.to_string());
        Ok(())
    }

    fn open(&self) -> Result<(), UiError> {
        info!("[notch {}] open", self.monitor);
        self.open.set(true);
        *self.module.borrow_mut() = None;
        Ok(())
    }

    fn close(&self) -> Result<(), UiError> {
        info!("[notch {}] close", self.monitor);
        self.open.set(false);
        *self.module.borrow_mut() = None;
        Ok(())
    }

    fn force_occlusion(&self) -> Result<(), UiError> {
        info!("[notch {}] occluded", self.monitor);
        self.occluded.set(true);
        Ok(())
    }

    fn restore_from_occlusion(&self) -> Result<(), UiError> {
        info!("[notch {}] restored", self.monitor);
        self.occluded.set(false);
        Ok(())
    }
}

/// A bar that starts visible.
#[derive(Debug)]
pub struct HeadlessBar {
    monitor: usize,
    visible: Cell<bool>,
}

impl HeadlessBar {
    pub fn new(monitor: usize) -> Self {
        Self {
            monitor,
            visible: Cell::new(true),
        }
    }
}

impl BarLike for HeadlessBar {
    fn get_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_visible(&self, visible: bool) -> Result<(), UiError> {
        info!(
            "[bar {}] {}",
            self.monitor,
            if visible { "shown" } else { "hidden" }
        );
        self.visible.set(visible);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HeadlessDock {
    monitor: usize,
    occluded: Cell<bool>,
}

impl HeadlessDock {
    pub fn new(monitor: usize) -> Self {
        Self {
            monitor,
            ..Self::default()
        }
    }

    pub fn is_occluded(&self) -> bool {
        self.occluded.get()
    }
}

impl DockLike for HeadlessDock {
    fn force_occlusion(&self) -> Result<(), UiError> {
        info!("[dock {}] occluded", self.monitor);
        self.occluded.set(true);
        Ok(())
    }

    fn restore_from_occlusion(&self) -> Result<(), UiError> {
        info!("[dock {}] restored", self.monitor);
        self.occluded.set(false);
        Ok(())
    }
}

/// Shared screen corners; carries no behaviour.
#[derive(Debug, Default)]
pub struct HeadlessCorners;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notch_tracks_module_and_occlusion() {
        let n = HeadlessNotch::new(0);
        assert!(!n.is_open());
        n.open_module("launcher").unwrap();
        assert!(n.is_open());
        assert_eq!(n.module().as_deref(), Some("launcher"));
        n.force_occlusion().unwrap();
        assert!(n.is_occluded());
        n.close().unwrap();
        assert!(!n.is_open());
        assert_eq!(n.module(), None);
        n.restore_from_occlusion().unwrap();
        assert!(!n.is_occluded());
    }

    #[test]
    fn bar_starts_visible() {
        let b = HeadlessBar::new(1);
        assert!(b.get_visible());
        b.set_visible(false).unwrap();
        assert!(!b.get_visible());
    }

    #[test]
    fn dock_occlusion() {
        let d = HeadlessDock::new(2);
        d.force_occlusion().unwrap();
        assert!(d.is_occluded());
        d.restore_from_occlusion().unwrap();
        assert!(!d.is_occluded());
    }
}
