//! Entry point for the **hyprnotch** daemon.
//!
//! Spawns the shortcut socket on a background thread and runs the UI loop
//! on the main thread.  The registry, the router and every UI instance stay
//! on the main thread; the socket thread and the focus listener only talk
//! to it through channels.

use hyprnotch::config::{config_dir, Config};
use hyprnotch::fallback::fallback_query;
use hyprnotch::hyprland::events::FocusEventListener;
use hyprnotch::hyprland::monitors::HyprctlQuery;
use hyprnotch::ipc::listener::UnixSocketListener;
use hyprnotch::registry::MonitorRegistry;
use hyprnotch::shell::Shell;
use hyprnotch::traits::{Request, RequestSource};
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Try to load the config from `$XDG_CONFIG_HOME/hyprnotch/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();
    let config = load_config();

    let query = HyprctlQuery::with_command(
        config.monitor_query.program.clone(),
        config.monitor_query.args.clone(),
    );
    let registry = MonitorRegistry::new(Box::new(query), fallback_query());
    info!("found {} monitor(s)", registry.get_monitors().len());

    // Without the event socket shortcuts still work; focus is just not followed.
    let listener = FocusEventListener::from_env_or_idle(registry.directory())
        .with_channel_capacity(config.listener.channel_capacity)
    .with_stop_timeout(config.listener.stop_timeout());

    let mut shell = Shell::new(registry, listener, config.poll_interval());
    shell.register_headless_instances(&config.selected_monitors);

    let (req_tx, req_rx) = mpsc::channel::<Request>();
    spawn_request_sources(config.socket_path(), req_tx);

    shell.run(req_rx);
}

fn spawn_request_sources(path: PathBuf, tx: mpsc::Sender<Request>) {
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
