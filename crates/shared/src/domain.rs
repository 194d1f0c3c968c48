use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BackendError, ErrorCode};

/// A named request for the backend together with its JSON-encoded arguments.
///
/// Arguments are checked against the target operation when the backend
/// decodes them; a missing or mistyped argument fails before any work is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = BackendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            other => Err(BackendError::new(
                ErrorCode::UnsupportedOperation,
                format!("unsupported operation: {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub sum: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

/// Platform notification permission as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Success,
    Error,
    Warning,
    Info,
}

pub const DEFAULT_NOTIFICATION_TITLE: &str = "System notification";
pub const DEFAULT_NOTIFICATION_BODY: &str = "This is a test notification!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Builds a notification whose title follows the fixed per-category
    /// prefix. `title` is only honoured for `Info`.
    pub fn new(category: NotificationCategory, title: Option<&str>, body: impl Into<String>) -> Self {
        let title = match category {
            NotificationCategory::Success => "✅ Operation succeeded".to_string(),
            NotificationCategory::Error => "❌ Operation failed".to_string(),
            NotificationCategory::Warning => "⚠️ Warning".to_string(),
            NotificationCategory::Info => match title.map(str::trim) {
                Some(title) if !title.is_empty() => title.to_string(),
                _ => DEFAULT_NOTIFICATION_TITLE.to_string(),
            },
        };
        Self {
            category,
            title,
            body: body.into(),
        }
    }

    pub fn success(body: impl Into<String>) -> Self {
        Self::new(NotificationCategory::Success, None, body)
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self::new(NotificationCategory::Error, None, body)
    }

    pub fn warning(body: impl Into<String>) -> Self {
        Self::new(NotificationCategory::Warning, None, body)
    }
}

/// Severity of a native message dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageKind::Info => "info",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
        })
    }
}

/// The currently open or edited text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileHandle {
    /// `None` while the buffer has never been saved.
    pub path: Option<PathBuf>,
    pub content: String,
    pub dirty: bool,
}

impl FileHandle {
    pub fn opened(path: PathBuf, content: String) -> Self {
        Self {
            path: Some(path),
            content,
            dirty: false,
        }
    }

    pub fn unsaved(content: String) -> Self {
        Self {
            path: None,
            content,
            dirty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryListing {
    pub root: PathBuf,
    pub entries: Vec<DirEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for WindowSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (width, height) = value
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("window size must look like WIDTHxHEIGHT, got '{value}'"))?;
        let width = width
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid window width '{width}': {err}"))?;
        let height = height
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid window height '{height}': {err}"))?;
        if width == 0 || height == 0 {
            return Err(format!("window size must be non-zero, got '{value}'"));
        }
        Ok(Self { width, height })
    }
}
