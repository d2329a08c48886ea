//! [`MonitorQuery`] backed by GDK's monitor list.
//!
//! GDK does not know which output has focus, so every monitor is reported
//! unfocused and the registry picks the first one.

use crate::command::MonitorInfo;
use crate::traits::{MonitorQuery, QueryError};
use gtk4::gdk;
use gtk4::prelude::*;
use log::debug;

/// Enumerates outputs through the default GDK display.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdkMonitorQuery;

impl MonitorQuery for GdkMonitorQuery {
    fn monitors(&self) -> Result<Vec<MonitorInfo>, QueryError> {
        gtk4::init().map_err(|e| QueryError(format!("gtk init failed: {}", e)))?;
        let display = gdk::Display::default()
            .ok_or_else(|| QueryError("no default GDK display".into()))?;

        let list = display.monitors();
        let mut monitors = Vec::new();
        for i in 0..list.n_items() {
            let Some(monitor) = list.item(i).and_downcast::<gdk::Monitor>() else {
                continue;
            };
            let geometry = monitor.geometry();
            let name = monitor
                .connector()
                .or_else(|| monitor.model())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("monitor-{}", i));
            monitors.push(MonitorInfo {
                name,
                width: geometry.width().max(0) as u32,
                height: geometry.height().max(0) as u32,
                x: geometry.x(),
                y: geometry.y(),
                scale: f64::from(monitor.scale_factor().max(1)),
                focused: false,
            });
        }
        debug!("GDK reports {} monitor(s)", monitors.len());
        Ok(monitors)
    }
}
