//! Dialogs rendered on the terminal.
//!
//! Messages are printed, confirmations read `y`/`n` and pickers read a path
//! from stdin, where an empty line means the user cancelled.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use orchestrator::providers::{Dialogs, FileFilter};
use shared::domain::MessageKind;
use tokio::sync::Mutex;

pub struct TerminalDialogs {
    assume_yes: bool,
    preset: Mutex<Option<PathBuf>>,
}

impl TerminalDialogs {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            preset: Mutex::new(None),
        }
    }

    /// The next picker returns `path` without asking.
    pub async fn preset(&self, path: PathBuf) {
        *self.preset.lock().await = Some(path);
    }

    async fn pick(&self, prompt: String) -> Result<Option<PathBuf>> {
        if let Some(path) = self.preset.lock().await.take() {
            println!("{prompt}: {}", path.display());
            return Ok(Some(path));
        }
        let answer = read_line(format!("{prompt} (empty to cancel): ")).await?;
        Ok(answer
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .map(PathBuf::from))
    }
}

fn describe(filters: &[FileFilter]) -> String {
    filters
        .iter()
        .map(|filter| format!("{} (*.{})", filter.name, filter.extensions.join(", *.")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn pick_file(&self, filters: &[FileFilter]) -> Result<Option<PathBuf>> {
        self.pick(format!("Open file [{}]", describe(filters))).await
    }

    async fn pick_save_path(
        &self,
        default_name: &str,
        filters: &[FileFilter],
    ) -> Result<Option<PathBuf>> {
        self.pick(format!(
            "Save as [{}] suggested '{default_name}'",
            describe(filters)
        ))
        .await
    }

    async fn pick_directory(&self) -> Result<Option<PathBuf>> {
        self.pick("Select directory".to_string()).await
    }

    async fn message(&self, kind: MessageKind, title: &str, text: &str) -> Result<()> {
        let prefix = match kind {
            MessageKind::Info => "ℹ",
            MessageKind::Warning => "⚠",
            MessageKind::Error => "✗",
        };
        println!("{prefix} [{title}] {text}");
        Ok(())
    }

    async fn ask(&self, title: &str, text: &str) -> Result<bool> {
        if self.assume_yes {
            println!("? [{title}] {text} [y/N] y");
            return Ok(true);
        }
        let answer = read_line(format!("? [{title}] {text} [y/N] ")).await?;
        Ok(answer.as_deref().is_some_and(is_yes))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints `prompt` and reads one line from stdin. `None` at end of input.
pub async fn read_line(prompt: String) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || read_line_blocking(&prompt))
        .await
        .context("stdin reader task failed")?
}

pub fn read_line_blocking(prompt: &str) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
