//! **hyprnotch** — per-monitor shell UI coordination for Hyprland.
//!
//! Every monitor carries a bar, a notch (a floating overlay hosting one
//! module at a time) and a dock.  hyprnotch keeps track of which monitor
//! has focus, routes shortcut actions to the UI of that monitor, and makes
//! sure at most one notch is open across all of them.  When focus moves
//! while a notch is open, the overlay follows to the new monitor.
//!
//! # Architecture
//!
//! * [`registry::MonitorRegistry`] is the authoritative monitor table and
//!   notch bookkeeping.  It lives on the UI thread.
//! * [`hyprland::events::FocusEventListener`] reads Hyprland's event socket
//!   on a background thread and queues focus changes for the UI thread.
//! * [`router::CommandRouter`] turns [`command::Action`]s into calls on the
//!   focused monitor's UI instances.
//! * [`shell::Shell`] wires the three together and runs the UI loop.
//!
//! The compositor, the UI toolkit and the shortcut transport sit behind the
//! traits in [`traits`]; [`hyprland`], [`ui`], [`fallback`] and [`ipc`]
//! provide the concrete implementations.

pub mod command;
pub mod config;
pub mod fallback;
pub mod hyprland;
pub mod ipc;
pub mod registry;
pub mod router;
pub mod shell;
pub mod traits;
pub mod ui;
pub mod workspace;

#[cfg(test)]
mod testing;
