//! Shared vocabulary for hyprnotch.
//!
//! [`Action`] names everything a shortcut can ask the shell to do,
//! [`FocusEvent`] is what the compositor event stream produces, and
//! [`Monitor`] / [`MonitorInfo`] / [`Role`] describe the screens and the
//! UI surfaces living on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named action routed to the focused monitor.
///
/// On the wire an action is a JSON value in `snake_case`:
///
/// ```json
/// "open_launcher"
/// "toggle_bar"
/// {"open_notch_module":"kanban"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    OpenLauncher,
    OpenOverview,
    OpenDashboard,
    OpenPowerMenu,
    OpenToolbox,
    OpenEmojiPicker,
    OpenClipboardHistory,
    ToggleNotch,
    ToggleBar,
    /// Open an arbitrary notch module by name.
    OpenNotchModule(String),
}

impl Action {
    /// The notch module this action opens, if it opens one.
    pub fn module(&self) -> Option<&str> {
        match self {
            Action::OpenLauncher => Some("launcher"),
            Action::OpenOverview => Some("overview"),
            Action::OpenDashboard => Some("dashboard"),
            Action::OpenPowerMenu => Some("power"),
            Action::OpenToolbox => Some("tools"),
            Action::OpenEmojiPicker => Some("emoji"),
            Action::OpenClipboardHistory => Some("cliphist"),
            Action::OpenNotchModule(name) => Some(name.as_str()),
            Action::ToggleNotch | Action::ToggleBar => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::OpenLauncher => write!(f, "launcher"),
            Action::OpenOverview => write!(f, "overview"),
            Action::OpenDashboard => write!(f, "dashboard"),
            Action::OpenPowerMenu => write!(f, "power menu"),
            Action::OpenToolbox => write!(f, "toolbox"),
            Action::OpenEmojiPicker => write!(f, "emoji picker"),
            Action::OpenClipboardHistory => write!(f, "clipboard history"),
            Action::ToggleNotch => write!(f, "notch toggle"),
            Action::ToggleBar => write!(f, "bar toggle"),
            Action::OpenNotchModule(name) => write!(f, "module {}", name),
        }
    }
}

/// Error returned when a command-line action name is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct UnknownAction(String);

/// Parse a command-line action name.
///
/// Case-insensitive; `-` and `_` are interchangeable.  `module:<name>`
/// selects an arbitrary notch module.
impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(name) = trimmed.strip_prefix("module:") {
            if name.is_empty() {
                return Err(UnknownAction(s.to_string()));
            }
            return Ok(Action::OpenNotchModule(name.to_string()));
        }
        let normalized: String = trimmed
            .chars()
            .map(|c| if c == '-' { '_' } else { c })
            .flat_map(|c| c.to_lowercase())
            .collect();
        match normalized.as_str() {
            "open_launcher" | "launcher" => Ok(Action::OpenLauncher),
            "open_overview" | "overview" => Ok(Action::OpenOverview),
            "open_dashboard" | "dashboard" => Ok(Action::OpenDashboard),
            "open_power_menu" | "power" => Ok(Action::OpenPowerMenu),
            "open_toolbox" | "tools" => Ok(Action::OpenToolbox),
            "open_emoji_picker" | "emoji" => Ok(Action::OpenEmojiPicker),
            "open_clipboard_history" | "cliphist" => Ok(Action::OpenClipboardHistory),
            "toggle_notch" => Ok(Action::ToggleNotch),
            "toggle_bar" => Ok(Action::ToggleBar),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// An event decoded from the compositor's event stream.
///
/// Produced once by the [`FocusEventListener`](crate::hyprland::events::FocusEventListener)
/// and consumed once on the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusEvent {
    /// Keyboard focus moved to another monitor.
    MonitorFocused {
        monitor_name: String,
        workspace_id: i32,
    },
    /// The active workspace changed.
    WorkspaceChanged { workspace_id: i32 },
}

/// UI surface kinds registered per monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Bar,
    Notch,
    Dock,
    Corners,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Bar => write!(f, "bar"),
            Role::Notch => write!(f, "notch"),
            Role::Dock => write!(f, "dock"),
            Role::Corners => write!(f, "corners"),
        }
    }
}

/// Raw monitor description as reported by a
/// [`MonitorQuery`](crate::traits::MonitorQuery), before ids are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    /// Name the compositor uses for this monitor (e.g. `"DP-1"`).
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    /// Output scale factor.
    pub scale: f64,
    /// Whether the source reports this monitor as focused.
    pub focused: bool,
}

/// A monitor known to the [`MonitorRegistry`](crate::registry::MonitorRegistry).
///
/// `id` is a dense ordinal assigned at refresh time and is only stable
/// within a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Monitor {
    pub id: usize,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    pub scale: f64,
    pub focused: bool,
}

impl Monitor {
    /// Build a monitor from query output.
    pub fn from_info(id: usize, info: MonitorInfo) -> Self {
        Self {
            id,
            name: info.name,
            width: info.width,
            height: info.height,
            x: info.x,
            y: info.y,
            scale: info.scale,
            focused: info.focused,
        }
    }

    /// The monitor synthesised when no source reports anything.
    pub fn synthetic_default() -> Self {
        Self {
            id: 0,
            name: "default".into(),
            width: 1920,
            height: 1080,
            x: 0,
            y: 0,
            scale: 1.0,
            focused: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&Action::OpenLauncher).unwrap(),
            r#""open_launcher""#
        );
        let a: Action = serde_json::from_str(r#""toggle_bar""#).unwrap();
        assert_eq!(a, Action::ToggleBar);
        let a: Action = serde_json::from_str(r#"{"open_notch_module":"kanban"}"#).unwrap();
        assert_eq!(a, Action::OpenNotchModule("kanban".into()));
    }

    #[test]
    fn action_modules() {
        assert_eq!(Action::OpenLauncher.module(), Some("launcher"));
        assert_eq!(Action::OpenPowerMenu.module(), Some("power"));
        assert_eq!(Action::OpenToolbox.module(), Some("tools"));
        assert_eq!(Action::OpenEmojiPicker.module(), Some("emoji"));
        assert_eq!(Action::OpenClipboardHistory.module(), Some("cliphist"));
        assert_eq!(Action::ToggleBar.module(), None);
    }

    #[test]
    fn parse_cli_names() {
        assert_eq!("open-launcher".parse::<Action>().unwrap(), Action::OpenLauncher);
        assert_eq!("open_overview".parse::<Action>().unwrap(), Action::OpenOverview);
        assert_eq!("Toggle-Bar".parse::<Action>().unwrap(), Action::ToggleBar);
        assert_eq!("cliphist".parse::<Action>().unwrap(), Action::OpenClipboardHistory);
        assert_eq!(
            "module:wallpapers".parse::<Action>().unwrap(),
            Action::OpenNotchModule("wallpapers".into())
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("launch-rockets".parse::<Action>().is_err());
        assert!("module:".parse::<Action>().is_err());
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Bar.to_string(), "bar");
        assert_eq!(Role::Notch.to_string(), "notch");
        assert_eq!(Role::Dock.to_string(), "dock");
        assert_eq!(Role::Corners.to_string(), "corners");
    }

    #[test]
    fn monitor_from_info_keeps_fields() {
        let m = Monitor::from_info(
            2,
            MonitorInfo {
                name: "HDMI-A-1".into(),
                width: 2560,
                height: 1440,
                x: 1920,
                y: 0,
                scale: 1.25,
                focused: true,
            },
        );
        assert_eq!(m.id, 2);
        assert_eq!(m.name, "HDMI-A-1");
        assert_eq!(m.scale, 1.25);
        assert!(m.focused);
    }
}
