//! `hyprnotch-msg`: send one action to the running daemon.
//!
//! ```text
//! hyprnotch-msg open-launcher
//! hyprnotch-msg toggle-bar
//! hyprnotch-msg module:kanban
//! ```
//!
//! Exits `0` when the daemon carried the action out, `1` otherwise.

use hyprnotch::command::Action;
use hyprnotch::config::{config_dir, Config};
use hyprnotch::ipc::client::send_action;
use log::debug;
use std::process::ExitCode;

const USAGE: &str = "usage: hyprnotch-msg <action>
actions: open-launcher open-overview open-dashboard open-power-menu
         open-toolbox open-emoji-picker open-clipboard-history
         toggle-notch toggle-bar module:<name>";

fn main() -> ExitCode {
    env_logger::init();

    let Some(arg) = std::env::args().nth(1) else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };
    let action: Action = match arg.parse() {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    let config = Config::load(&config_dir().join("config.json")).unwrap_or_default();
    let path = config.socket_path();
    debug!("sending {:?} to {}", action, path.display());

    match send_action(&path, &action) {
        Ok(true) => {
            println!("ok: {}", action);
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("failed: {}", action);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
