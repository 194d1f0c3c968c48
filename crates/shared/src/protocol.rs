use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::WindowSize;

pub mod commands {
    pub const GREET: &str = "greet";
    pub const CALCULATE: &str = "calculate";
    pub const SAFE_DIVIDE: &str = "safe_divide";
    pub const GET_TIMESTAMP: &str = "get_timestamp";
    pub const GET_SYSTEM_INFO: &str = "get_system_info";
    pub const PROCESS_NUMBERS: &str = "process_numbers";
}

/// Event carrying a menu selection from the native shell to the front-end.
pub const MENU_ACTION_EVENT: &str = "menu-action";

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const SECONDARY_WINDOW_LABEL: &str = "secondary";

/// A named event pushed by the backend with an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEvent {
    pub name: String,
    pub payload: Value,
}

impl BackendEvent {
    pub fn new(name: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    pub fn menu_action(action: MenuAction) -> Self {
        Self::new(MENU_ACTION_EVENT, action.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    New,
    Open,
    Save,
    SaveAs,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    About,
    Unrecognized(String),
}

impl MenuAction {
    pub fn from_id(id: &str) -> Self {
        match id {
            "new" => MenuAction::New,
            "open" => MenuAction::Open,
            "save" => MenuAction::Save,
            "save_as" => MenuAction::SaveAs,
            "undo" => MenuAction::Undo,
            "redo" => MenuAction::Redo,
            "cut" => MenuAction::Cut,
            "copy" => MenuAction::Copy,
            "paste" => MenuAction::Paste,
            "zoom_in" => MenuAction::ZoomIn,
            "zoom_out" => MenuAction::ZoomOut,
            "zoom_reset" => MenuAction::ZoomReset,
            "about" => MenuAction::About,
            other => MenuAction::Unrecognized(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            MenuAction::New => "new",
            MenuAction::Open => "open",
            MenuAction::Save => "save",
            MenuAction::SaveAs => "save_as",
            MenuAction::Undo => "undo",
            MenuAction::Redo => "redo",
            MenuAction::Cut => "cut",
            MenuAction::Copy => "copy",
            MenuAction::Paste => "paste",
            MenuAction::ZoomIn => "zoom_in",
            MenuAction::ZoomOut => "zoom_out",
            MenuAction::ZoomReset => "zoom_reset",
            MenuAction::About => "about",
            MenuAction::Unrecognized(id) => id,
        }
    }

    /// Decodes the payload of a `menu-action` event. Non-string payloads
    /// are treated as unrecognized.
    pub fn from_payload(payload: &Value) -> Self {
        match payload {
            Value::String(id) => Self::from_id(id),
            other => MenuAction::Unrecognized(other.to_string()),
        }
    }
}

/// Geometry and focus changes reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WindowEvent {
    Resized(WindowSize),
    FocusChanged(bool),
}
