//! Unix-socket [`RequestSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Action`], handed to the
//! UI loop, and answered with one line once the action has been routed.
//!
//! # Wire format
//!
//! Requests, one per line:
//!
//! ```json
//! "open_launcher"
//! "toggle_notch"
//! {"open_notch_module":"kanban"}
//! ```
//!
//! Replies, one per request:
//!
//! ```json
//! {"ok":true}
//! {"ok":false}
//! ```

use crate::command::Action;
use crate::traits::{Request, RequestSource};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// How long a connected client may stay silent before it is dropped.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// The answer written back for every request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
}

/// A [`RequestSource`] that listens on a Unix stream socket for
/// JSON-encoded actions.
///
/// Each accepted connection can send multiple newline-delimited actions.
/// When the connection closes, or stays silent for longer than the read
/// timeout, the listener waits for the next one.
pub struct UnixSocketListener {
    path: PathBuf,
    read_timeout: Duration,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether the listener should keep accepting connections.
enum Flow {
    Continue,
    SinkClosed,
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](RequestSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn serve(&self, stream: UnixStream, sink: &mpsc::Sender<Request>) -> Result<Flow, UnixSocketError> {
        // A zero timeout would mean "block forever".
        stream.set_read_timeout(Some(self.read_timeout.max(Duration::from_millis(1))))?;
        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let text = line?;
            if text.trim().is_empty() {
                continue;
            }
            let ok = match serde_json::from_str::<Action>(&text) {
                Ok(action) => {
                    debug!("received {:?}", action);
                    let (request, answer) = Request::new(action);
                    if sink.send(request).is_err() {
                        info!("sink closed, shutting down");
                        write_reply(&mut writer, false)?;
                        return Ok(Flow::SinkClosed);
                    }
                    // A dropped reply sender means the request was discarded.
                    answer.recv().unwrap_or(false)
                }
                Err(e) => {
                    warn!("bad action {:?}: {}", text, e);
                    false
                }
            };
            write_reply(&mut writer, ok)?;
        }
        Ok(Flow::Continue)
    }
}

fn write_reply(writer: &mut impl Write, ok: bool) -> Result<(), UnixSocketError> {
    let mut line = serde_json::to_string(&Reply { ok })?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

impl RequestSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the sink is closed.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    match self.serve(stream, &sink) {
                        Ok(Flow::SinkClosed) => break,
                        Ok(Flow::Continue) => debug!("client disconnected"),
                        Err(UnixSocketError::Io(e))
                            if matches!(
                                e.kind(),
                                ErrorKind::WouldBlock | ErrorKind::TimedOut
                            ) =>
                        {
                            debug!("client idle for {:?}, dropped", self.read_timeout)
                        }
                        Err(e) => error!("client error: {}", e),
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests
