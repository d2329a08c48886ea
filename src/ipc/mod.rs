//! Shortcut transport over a Unix socket.
//!
//! Key-bind helpers connect to the socket, send newline-delimited JSON
//! actions, and read one `{"ok":...}` line back per action.  [`listener`]
//! is the daemon side, [`client`] the sending side.

pub mod client;
pub mod listener;
