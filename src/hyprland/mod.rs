//! Hyprland-specific implementations.
//!
//! [`monitors`] enumerates outputs through `hyprctl`, [`events`] follows
//! focus on Hyprland's event socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod events;
pub mod monitors;
