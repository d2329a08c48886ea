//! Core traits that decouple hyprnotch from the compositor, the UI toolkit
//! and the shortcut transport.
//!
//! The [`MonitorRegistry`](crate::registry::MonitorRegistry) and the
//! [`CommandRouter`](crate::router::CommandRouter) only depend on these
//! abstractions; concrete backends live in [`hyprland`](crate::hyprland),
//! [`ui`](crate::ui), [`fallback`](crate::fallback) and [`ipc`](crate::ipc).

use crate::command::{Action, MonitorInfo};
use std::sync::mpsc;

//  Monitor discovery

/// Error from a [`MonitorQuery`].
#[derive(Debug, thiserror::Error)]
#[error("monitor query error: {0}")]
pub struct QueryError(pub String);

/// A source that can enumerate the monitors currently attached.
///
/// The registry asks its primary query (the compositor) first and falls
/// back to a secondary one (the windowing system) when that fails.
pub trait MonitorQuery {
    /// Return the monitors in the order their ids should be assigned.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, QueryError>;
}

//  UI contracts

/// Error reported by a UI instance.
#[derive(Debug, thiserror::Error)]
#[error("ui error: {0}")]
pub struct UiError(pub String);

/// The floating overlay of one monitor, hosting one module at a time.
///
/// Methods take `&self`: UI handles are owned by the UI thread and use
/// interior mutability, the way toolkit widgets do.
pub trait NotchLike {
    /// Show the notch with the named module.
    fn open_module(&self, module: &str) -> Result<(), UiError>;
    /// Show the notch without selecting a module.
    fn open(&self) -> Result<(), UiError>;
    /// Hide the notch.
    fn close(&self) -> Result<(), UiError>;
    /// Switch to the occluded (minimised) presentation.
    fn force_occlusion(&self) -> Result<(), UiError>;
    /// Leave the occluded presentation.
    fn restore_from_occlusion(&self) -> Result<(), UiError>;
}

/// The status bar of one monitor.
pub trait BarLike {
    fn get_visible(&self) -> bool;
    fn set_visible(&self, visible: bool) -> Result<(), UiError>;
}

/// The dock of one monitor.
pub trait DockLike {
    fn force_occlusion(&self) -> Result<(), UiError>;
    fn restore_from_occlusion(&self) -> Result<(), UiError>;
}

//  Request Source

/// An [`Action`] delivered to the UI loop together with a reply channel.
///
/// The UI loop answers with the router's success flag.  A source that does
/// not care about the outcome may drop the receiving half.
#[derive(Debug)]
pub struct Request {
    pub action: Action,
    pub reply: mpsc::Sender<bool>,
}

impl Request {
    /// Build a request and the receiver its answer will arrive on.
    pub fn new(action: Action) -> (Self, mpsc::Receiver<bool>) {
        let (reply, rx) = mpsc::channel();
        (Self { action, reply }, rx)
    }
}

/// A source of [`Request`]s.
///
/// Implementations listen on some transport (a Unix socket, a test
/// harness, …) and forward parsed actions into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](RequestSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received action must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait RequestSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Request`] into `sink`.
    ///
    /// This method blocks the calling thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}
