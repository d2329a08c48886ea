//! [`MonitorQuery`] implementation backed by `hyprctl monitors -j`.
//!
//! The command is run to completion on the calling thread; a non-zero exit
//! status or unparsable output is reported as a [`QueryError`] so the
//! registry can fall back to another source.

use crate::command::MonitorInfo;
use crate::traits::{MonitorQuery, QueryError};
use log::debug;
use serde::Deserialize;
use std::process::Command;

/// Queries Hyprland for its monitors by running `hyprctl`.
#[derive(Debug, Clone)]
pub struct HyprctlQuery {
    program: String,
    args: Vec<String>,
}

impl Default for HyprctlQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl HyprctlQuery {
    /// Run `hyprctl monitors -j`.
    pub fn new() -> Self {
        Self::with_command("hyprctl", ["monitors", "-j"])
    }

    /// Run an arbitrary command that prints the same JSON.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

//  Minimal serde struct for the JSON we care about

/// Subset of one object in the `monitors -j` array.
///
/// Missing fields take the values a plain 1080p output would have.
#[derive(Deserialize)]
struct MonitorJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default)]
    focused: bool,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_scale() -> f64 {
    1.0
}

/// Parse the output of `hyprctl monitors -j`.
pub fn parse_monitors(json: &str) -> Result<Vec<MonitorInfo>, QueryError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| QueryError(format!("parse: {}", e)))?;
    Ok(monitors
        .into_iter()
        .enumerate()
        .map(|(i, m)| MonitorInfo {
            name: m.name.unwrap_or_else(|| format!("monitor-{}", i)),
            width: m.width,
            height: m.height,
            x: m.x,
            y: m.y,
            scale: if m.scale.is_finite() && m.scale >= 0.0 {
                m.scale
            } else {
                1.0
            },
            focused: m.focused,
        })
        .collect())
}

impl MonitorQuery for HyprctlQuery {
    fn monitors(&self) -> Result<Vec<MonitorInfo>, QueryError> {
        debug!("running {} {}", self.program, self.args.join(" "));
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| QueryError(format!("spawn {}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(QueryError(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        let stdout =
            String::from_utf8(output.stdout).map_err(|e| QueryError(format!("utf-8: {}", e)))?;
        parse_monitors(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": 0, "name": "DP-1", "description": "Dell U2720Q",
            "width": 3840, "height": 2160, "refreshRate": 59.997,
            "x": 0, "y": 0, "scale": 1.5, "focused": false,
            "activeWorkspace": {"id": 2, "name": "2"}
        },
        {
            "id": 1, "name": "HDMI-A-1",
            "width": 1920, "height": 1080,
            "x": 2560, "y": 0, "scale": 1.0, "focused": true
        }
    ]"#;

    #[test]
    fn parses_hyprctl_output() {
        let monitors = parse_monitors(SAMPLE).unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].name, "DP-1");
        assert_eq!((monitors[0].width, monitors[0].height), (3840, 2160));
        assert_eq!(monitors[0].scale, 1.5);
        assert!(!monitors[0].focused);
        assert_eq!(monitors[1].name, "HDMI-A-1");
        assert_eq!(monitors[1].x, 2560);
        assert!(monitors[1].focused);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let monitors = parse_monitors(r#"[{}, {"name": "DP-2", "scale": -2.0}]"#).unwrap();
        assert_eq!(monitors[0].name, "monitor-0");
        assert_eq!((monitors[0].width, monitors[0].height), (1920, 1080));
        assert_eq!(monitors[0].scale, 1.0);
        assert!(!monitors[0].focused);
        assert_eq!(monitors[1].scale, 1.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_monitors("not json").is_err());
        assert!(parse_monitors(r#"{"name": "DP-1"}"#).is_err());
    }

    #[test]
    fn runs_command_and_parses_stdout() {
        let q = HyprctlQuery::with_command(
            "sh",
            ["-c", r#"echo '[{"name":"DP-1","focused":true}]'"#],
        );
        let monitors = q.monitors().unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].name, "DP-1");
        assert!(monitors[0].focused);
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let q = HyprctlQuery::with_command("sh", ["-c", "echo '[]'; exit 3"]);
        assert!(q.monitors().is_err());
    }

    #[test]
    fn missing_program_is_an_error() {
        let q = HyprctlQuery::with_command("hyprnotch-no-such-program", Vec::<String>::new());
        let err = q.monitors().unwrap_err();
        assert!(err.to_string().contains("spawn"));
    }
}
