//! Sending side of the shortcut socket.

use super::listener::Reply;
use crate::command::Action;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

/// Errors produced while talking to the daemon.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot reach daemon: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad reply: {0}")]
    Json(#[from] serde_json::Error),
    #[error("daemon closed the connection without replying")]
    NoReply,
}

/// Send one action and wait for the daemon's verdict.
pub fn send_action(path: &Path, action: &Action) -> Result<bool, ClientError> {
    let mut stream = UnixStream::connect(path)?;
    let mut line = serde_json::to_string(action)?;
    line.push('\n');
    stream.write_all(line.as_bytes())?;
    stream.flush()?;

    let mut reader = BufReader::new(stream);
    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        return Err(ClientError::NoReply);
    }
    let reply: Reply = serde_json::from_str(answer.trim())?;
    Ok(reply.ok)
}
