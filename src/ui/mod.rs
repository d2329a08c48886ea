//! UI instance implementations.
//!
//! Real widgets live in the shell front-end; this module only ships the
//! [`headless`] instances the daemon uses on its own.

pub mod headless;
