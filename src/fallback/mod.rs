//! Secondary monitor enumeration used when the compositor cannot be asked.
//!
//! With the `gdk-fallback` feature the registry falls back to the outputs
//! GDK reports.  Without it, [`fallback_query`] returns `None` and the
//! registry goes straight to its synthetic default monitor.

#[cfg(feature = "gdk-fallback")]
pub mod gdk;

use crate::traits::MonitorQuery;

/// The fallback query compiled into this build, if any.
pub fn fallback_query() -> Option<Box<dyn MonitorQuery>> {
    #[cfg(feature = "gdk-fallback")]
    {
        Some(Box::new(gdk::GdkMonitorQuery))
    }
    #[cfg(not(feature = "gdk-fallback"))]
    {
        None
    }
}
