//! Tracks monitor focus from Hyprland's event socket.
//!
//! Hyprland broadcasts events on `socket2` as `EVENT>>DATA\n` lines:
//!
//! | Event        | Payload                      | Emitted as                           |
//! |--------------|------------------------------|--------------------------------------|
//! | `focusedmon` | `<monitor>,<workspace name>` | [`FocusEvent::MonitorFocused`]       |
//! | `workspace`  | `<workspace name>`           | [`FocusEvent::WorkspaceChanged`]     |
//!
//! Everything else is ignored.  Workspace names that are not numbers
//! resolve to workspace `1`.
//!
//! [`FocusEventListener`] reads the socket on a dedicated thread and hands
//! the decoded events to the UI loop through a bounded channel; it never
//! touches the [`MonitorRegistry`](crate::registry::MonitorRegistry).  The
//! only registry data it reads is the thread-safe [`MonitorDirectory`],
//! used to resolve monitor names to ids.
//!
//! When the socket closes or fails the listener drops back to
//! [`ListenerState::NotListening`] and stays there until
//! [`start_listening`](FocusEventListener::start_listening) is called again.

use crate::command::{FocusEvent, Monitor};
use crate::registry::MonitorDirectory;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default bound of the listener → UI channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Default time [`FocusEventListener::stop_listening`] waits for the
/// reader thread.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(1000);

/// Workspace assumed when a workspace name is not numeric.
const FALLBACK_WORKSPACE: i32 = 1;

/// Error from the focus event listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("{0} not set")]
    MissingEnv(&'static str),
    #[error("connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the Hyprland event socket path.
///
/// Hyprland stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`.
pub fn socket2_path() -> Result<PathBuf, ListenerError> {
    let runtime_dir =
        std::env::var("XDG_RUNTIME_DIR").map_err(|_| ListenerError::MissingEnv("XDG_RUNTIME_DIR"))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| ListenerError::MissingEnv("HYPRLAND_INSTANCE_SIGNATURE"))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket2.sock",
        runtime_dir, his
    )))
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(">>")
}

fn parse_workspace(name: &str) -> i32 {
    name.trim().parse().unwrap_or(FALLBACK_WORKSPACE)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Whether the listener thread is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    NotListening,
    Listening,
}

/// Last-known focus, shared between the reader thread and the UI thread.
#[derive(Debug)]
struct Tracking {
    monitor_name: String,
    workspace: i32,
    /// Name → id cache, re-synced from the directory on a miss.
    ids: HashMap<String, usize>,
}

impl Default for Tracking {
    fn default() -> Self {
        Self {
            monitor_name: String::new(),
            workspace: FALLBACK_WORKSPACE,
            ids: HashMap::new(),
        }
    }
}

/// One connection's worth of state.  A fresh session is created on every
/// [`FocusEventListener::start_listening`], so a reader thread that outlives
/// its stop request cannot disturb a newer connection.
struct Session {
    listening: AtomicBool,
    /// Handle used to shut the socket down and unblock the reader.
    stream: Mutex<Option<UnixStream>>,
}

struct Worker {
    handle: JoinHandle<()>,
    done: mpsc::Receiver<()>,
}

/// Background consumer of Hyprland's event socket.
///
/// # Typical usage
///
/// ```ignore
/// let mut listener = FocusEventListener::from_env(registry.directory())?;
/// listener.start_listening()?;
/// // on the UI loop:
/// for event in listener.drain() {
///     // redeliver into the registry
/// }
/// ```
pub struct FocusEventListener {
    path: PathBuf,
    directory: MonitorDirectory,
    tracking: Arc<Mutex<Tracking>>,
    tx: mpsc::SyncSender<FocusEvent>,
    rx: mpsc::Receiver<FocusEvent>,
    session: Option<Arc<Session>>,
    worker: Option<Worker>,
    stop_timeout: Duration,
}

impl FocusEventListener {
    /// Create a listener for the event socket at `path`.
    ///
    /// Nothing is connected until [`start_listening`](Self::start_listening).
    pub fn new(path: impl AsRef<Path>, directory: MonitorDirectory) -> Self {
        let (tx, rx) = mpsc::sync_channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            path: path.as_ref().to_path_buf(),
            directory,
            tracking: Arc::new(Mutex::new(Tracking::default())),
            tx,
            rx,
            session: None,
            worker: None,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Create a listener for the running Hyprland instance.
    pub fn from_env(directory: MonitorDirectory) -> Result<Self, ListenerError> {
        Ok(Self::new(socket2_path()?, directory))
    }

    /// Like [`from_env`](Self::from_env), but a socket that cannot be
    /// located yields a listener that never connects instead of an error.
    pub fn from_env_or_idle(directory: MonitorDirectory) -> Self {
        Self::from_resolved_path(socket2_path(), directory)
    }

    fn from_resolved_path(path: Result<PathBuf, ListenerError>, directory: MonitorDirectory) -> Self {
        match path {
            Ok(path) => Self::new(path, directory),
            Err(e) => {
                warn!("cannot locate the Hyprland event socket: {}", e);
                Self::new(PathBuf::new(), directory)
            }
        }
    }

    /// Bound the listener → UI channel to `capacity` events.
    ///
    /// When the channel is full the reader thread waits for the UI loop to
    /// drain it.  Events already queued are discarded.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        self.tx = tx;
        self.rx = rx;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// The event socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ListenerState {
        if self.is_listening() {
            ListenerState::Listening
        } else {
            ListenerState::NotListening
        }
    }

    pub fn is_listening(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.listening.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Connect to the event socket and start the reader thread.
    ///
    /// Does nothing if already listening.  A connection that died earlier is
    /// not retried automatically; this call is the only way back.
    pub fn start_listening(&mut self) -> Result<(), ListenerError> {
        if self.is_listening() {
            return Ok(());
        }
        self.reap_worker();

        let stream = UnixStream::connect(&self.path).map_err(|source| ListenerError::Connect {
            path: self.path.clone(),
            source,
        })?;
        let reader = stream.try_clone()?;
        info!("listening for focus events on {}", self.path.display());

        let session = Arc::new(Session {
            listening: AtomicBool::new(true),
            stream: Mutex::new(Some(stream)),
        });
        let (done_tx, done_rx) = mpsc::channel();

        let thread_session = session.clone();
        let tracking = self.tracking.clone();
        let directory = self.directory.clone();
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name("focus-listener".into())
            .spawn(move || {
                read_loop(reader, &thread_session, &tracking, &directory, &tx);
                lock(&thread_session.stream).take();
                thread_session.listening.store(false, Ordering::Release);
                let _ = done_tx.send(());
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                session.listening.store(false, Ordering::Release);
                return Err(e.into());
            }
        };
        self.session = Some(session);
        self.worker = Some(Worker {
            handle,
            done: done_rx,
        });
        Ok(())
    }

    /// Stop the reader thread.
    ///
    /// The socket is shut down to unblock the pending read, then the thread
    /// is joined for at most the configured stop timeout.  A thread that
    /// does not finish in time is detached.
    pub fn stop_listening(&mut self) {
        if let Some(session) = self.session.take() {
            session.listening.store(false, Ordering::Release);
            if let Some(stream) = lock(&session.stream).take() {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }

        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker.done.recv_timeout(self.stop_timeout) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    error!("focus listener thread panicked");
                }
                info!("stopped listening for focus events");
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    "focus listener did not stop within {:?}, detaching",
                    self.stop_timeout
                );
            }
        }
    }

    /// Join a reader thread that already finished on its own.
    fn reap_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.done.try_recv().is_ok() && worker.handle.join().is_err() {
                error!("focus listener thread panicked");
            }
        }
    }

    //  UI-loop side

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<FocusEvent> {
        self.rx.try_iter().collect()
    }

    /// Take the oldest queued event, if any.
    pub fn try_recv(&self) -> Option<FocusEvent> {
        self.rx.try_recv().ok()
    }

    //  Last-known focus

    /// Id of the last focused monitor; `0` when it cannot be resolved.
    pub fn get_current_monitor_id(&self) -> usize {
        let name = lock(&self.tracking).monitor_name.clone();
        self.get_monitor_id_by_name(&name).unwrap_or(0)
    }

    /// Name of the last focused monitor; empty before the first event.
    pub fn get_current_monitor_name(&self) -> String {
        lock(&self.tracking).monitor_name.clone()
    }

    /// Last reported workspace; `1` before the first event.
    pub fn get_current_workspace(&self) -> i32 {
        lock(&self.tracking).workspace
    }

    /// Resolve `name` against the latest refresh, then the local cache.
    pub fn get_monitor_id_by_name(&self, name: &str) -> Option<usize> {
        self.directory
            .lookup(name)
            .or_else(|| lock(&self.tracking).ids.get(name).copied())
    }

    /// Monitor `id` as of the latest refresh.
    pub fn get_monitor_info(&self, id: usize) -> Option<Monitor> {
        self.directory.monitor(id)
    }

    /// The monitor [`get_current_monitor_id`](Self::get_current_monitor_id) resolves to.
    pub fn get_current_monitor_info(&self) -> Option<Monitor> {
        self.get_monitor_info(self.get_current_monitor_id())
    }

    /// Scale of the last focused monitor; `1.0` when it is unknown.
    pub fn get_current_monitor_scale(&self) -> f64 {
        self.get_current_monitor_info()
            .map(|m| m.scale)
            .unwrap_or(1.0)
    }

    /// Decode one event line and update the last-known focus.
    pub(crate) fn ingest(&self, line: &str) -> Option<FocusEvent> {
        ingest(&self.tracking, &self.directory, line)
    }
}

impl Drop for FocusEventListener {
    fn drop(&mut self) {
        if self.is_listening() {
            self.stop_listening();
        }
    }
}

fn read_loop(
    stream: UnixStream,
    session: &Session,
    tracking: &Mutex<Tracking>,
    directory: &MonitorDirectory,
    tx: &mpsc::SyncSender<FocusEvent>,
) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        if !session.listening.load(Ordering::Acquire) {
            debug!("stop requested, leaving read loop");
            return;
        }
        match line {
            Ok(line) => {
                if let Some(event) = ingest(tracking, directory, &line) {
                    if tx.send(event).is_err() {
                        info!("event channel closed, leaving read loop");
                        return;
                    }
                }
            }
            Err(e) => {
                error!("event socket read error: {}", e);
                return;
            }
        }
    }
    if session.listening.load(Ordering::Acquire) {
        warn!("event stream ended; call start_listening to reconnect");
    }
}

fn ingest(
    tracking: &Mutex<Tracking>,
    directory: &MonitorDirectory,
    line: &str,
) -> Option<FocusEvent> {
    let (event, data) = parse_event_line(line.trim_end())?;
    match event {
        "focusedmon" => {
            let (monitor_name, workspace) = data.split_once(',')?;
            let workspace_id = parse_workspace(workspace);

            let mut tracking = lock(tracking);
            if !tracking.ids.contains_key(monitor_name) {
                tracking.ids = directory.snapshot();
            }
            tracking.monitor_name = monitor_name.to_string();
            tracking.workspace = workspace_id;
            debug!(
                "focusedmon: {} (id {:?}), workspace {}",
                monitor_name,
                tracking.ids.get(monitor_name),
                workspace_id
            );

            Some(FocusEvent::MonitorFocused {
                monitor_name: monitor_name.to_string(),
                workspace_id,
            })
        }
        "workspace" => {
            let workspace_id = parse_workspace(data);
            lock(tracking).workspace = workspace_id;
            debug!("workspace: {}", workspace_id);
            Some(FocusEvent::WorkspaceChanged { workspace_id })
        }
        _ => None,
    }
}

//  Tests
