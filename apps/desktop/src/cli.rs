use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use shared::domain::{MessageKind, NotificationCategory, Operation};

#[derive(Parser, Debug)]
#[command(name = "desktop", about = "Command and confirmation-workflow shell")]
pub struct Args {
    /// Configuration file; defaults to ./desktop.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Answer every confirmation with yes.
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
    #[command(subcommand)]
    pub action: Option<Action>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    Greet { name: String },
    /// `calc 6 multiply 7`
    Calc {
        a: String,
        #[arg(value_enum)]
        operation: OperationArg,
        b: String,
    },
    Divide { a: String, b: String },
    /// Comma separated numbers, e.g. `stats 1,2,3`.
    Stats {
        #[arg(default_value = "")]
        numbers: String,
    },
    Timestamp,
    Sysinfo,
    Open { path: Option<PathBuf> },
    /// Saves the buffer, asking for a destination when it has none.
    Save {
        path: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
    },
    SaveAs {
        path: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Deletes the open file, or `path` after opening it.
    Delete { path: Option<PathBuf> },
    ListDir { path: Option<PathBuf> },
    Exists {
        #[arg(default_value = "")]
        path: String,
    },
    Notify {
        #[arg(long, value_enum, default_value = "info")]
        category: CategoryArg,
        #[arg(long)]
        title: Option<String>,
        body: Vec<String>,
    },
    /// Shows the info, warning and error sample dialogs.
    Dialogs,
    Confirm,
    Chain,
    /// Simulates a native menu selection; lists the menus without an id.
    Menu { id: Option<String> },
    #[command(subcommand)]
    Window(WindowAction),
    /// Interactive session; the default.
    Repl,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum WindowAction {
    Title { title: Vec<String> },
    Size { size: String },
    Center,
    ToggleSecondary,
    Close {
        #[arg(default_value = "main")]
        label: String,
    },
    /// Tray menu item, or a left click on the icon without one.
    Tray { item: Option<String> },
    Show,
}

/// Commands only meaningful inside the REPL.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(no_binary_name = true, disable_help_flag = true, disable_help_subcommand = true)]
pub enum ReplCommand {
    #[command(flatten)]
    Action(Action),
    /// Replaces the buffer content.
    Edit { text: Vec<String> },
    Close,
    /// Prints the current view state.
    View,
    Help,
    #[command(alias = "exit")]
    Quit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationArg {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl From<OperationArg> for Operation {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Add => Operation::Add,
            OperationArg::Subtract => Operation::Subtract,
            OperationArg::Multiply => Operation::Multiply,
            OperationArg::Divide => Operation::Divide,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryArg {
    Success,
    Error,
    Warning,
    Info,
}

impl From<CategoryArg> for NotificationCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Success => NotificationCategory::Success,
            CategoryArg::Error => NotificationCategory::Error,
            CategoryArg::Warning => NotificationCategory::Warning,
            CategoryArg::Info => NotificationCategory::Info,
        }
    }
}

pub const DIALOG_KINDS: [MessageKind; 3] =
    [MessageKind::Info, MessageKind::Warning, MessageKind::Error];
