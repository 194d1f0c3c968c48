//! Drives a [`Session`] from parsed terminal commands.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Result};
use backend::shell::{self, MenuRoute, TrayCommand};
use clap::{CommandFactory, Parser};
use orchestrator::{DispatchOutcome, Providers, Session, ViewState, WorkflowReport, WorkflowState};
use platform::{ConsoleNotifier, EventBus, HeadlessWindow, InProcessBackend, LocalFileSystem};
use shared::domain::{FileHandle, Statistics};

use crate::{
    cli::{Action, ReplCommand, WindowAction, DIALOG_KINDS},
    config::DesktopSettings,
    dialogs::{is_yes, read_line, read_line_blocking, TerminalDialogs},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    session: Session,
    dialogs: Arc<TerminalDialogs>,
    bus: EventBus,
    window: Arc<HeadlessWindow>,
}

impl App {
    /// Builds the providers and starts the session. Requires a tokio runtime.
    pub fn build(settings: &DesktopSettings, assume_yes: bool) -> Self {
        let bus = EventBus::new();
        let window = Arc::new(HeadlessWindow::new(
            settings.window_title.clone(),
            settings.window_size,
            bus.window_publisher(),
        ));
        let dialogs = Arc::new(TerminalDialogs::new(assume_yes));
        let notifier = ConsoleNotifier::new(settings.notification_permission).with_prompt(
            Arc::new(move || -> Result<bool> {
                if assume_yes {
                    return Ok(true);
                }
                let answer = read_line_blocking("Allow desktop notifications? [y/N] ")?;
                Ok(answer.as_deref().is_some_and(is_yes))
            }),
        );

        let providers = Providers {
            backend: Arc::new(InProcessBackend),
            fs: Arc::new(LocalFileSystem),
            dialogs: dialogs.clone(),
            notifications: Arc::new(notifier),
            window: window.clone(),
            events: Arc::new(bus.clone()),
        };
        let session = Session::start(providers, settings.session_settings());

        Self {
            session,
            dialogs,
            bus,
            window,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn shutdown(&self) {
        self.session.end().await;
    }

    pub async fn run(&self, action: Action) -> Result<Flow> {
        tracing::debug!(?action, "running action");
        match action {
            Action::Greet { name } => println!("{}", self.session.greet(&name).await?),
            Action::Calc { a, operation, b } => {
                println!("{}", self.session.calculate(operation.into(), &a, &b).await?)
            }
            Action::Divide { a, b } => println!("{}", self.session.safe_divide(&a, &b).await?),
            Action::Stats { numbers } => match self.session.process_numbers(&numbers).await? {
                Some(stats) => print_statistics(&stats),
                None => println!("no numbers given; statistics cleared"),
            },
            Action::Timestamp => {
                let timestamp = self.session.refresh_timestamp().await?;
                println!("{} ({})", timestamp.seconds, timestamp.formatted);
            }
            Action::Sysinfo => println!("{}", self.session.system_info().await?),
            Action::Open { path } => {
                self.preset(path).await;
                self.open().await?;
            }
            Action::Save { path, content } => {
                if let Some(content) = content {
                    self.session.edit(content).await;
                }
                let report = match path {
                    Some(path) => {
                        self.dialogs.preset(path).await;
                        self.session.save_as().await
                    }
                    None => self.session.save().await,
                };
                finish(report)?;
            }
            Action::SaveAs { path, content } => {
                if let Some(content) = content {
                    self.session.edit(content).await;
                }
                self.preset(path).await;
                finish(self.session.save_as().await)?;
            }
            Action::Delete { path } => {
                if let Some(path) = path {
                    self.dialogs.preset(path).await;
                    if self.open().await?.is_none() {
                        return Ok(Flow::Continue);
                    }
                }
                finish(self.session.delete().await)?;
            }
            Action::ListDir { path } => {
                self.preset(path).await;
                match self.session.select_directory().await.map_err(|reason| anyhow!(reason))? {
                    Some(listing) => {
                        println!("{}", listing.root.display());
                        for entry in listing.entries {
                            let marker = if entry.is_directory { "📁" } else { "📄" };
                            println!("  {marker} {}", entry.name);
                        }
                    }
                    None => println!("cancelled"),
                }
            }
            Action::Exists { path } => {
                match self.session.check_exists(&path).await.map_err(|reason| anyhow!(reason))? {
                    Some(true) => println!("{} exists", path.trim()),
                    Some(false) => println!("{} does not exist", path.trim()),
                    None => {}
                }
            }
            Action::Notify {
                category,
                title,
                body,
            } => {
                let body = body.join(" ");
                let outcome = self
                    .session
                    .notify(category.into(), title.as_deref(), Some(body.as_str()))
                    .await;
                if let DispatchOutcome::Failed(reason) = outcome {
                    bail!(reason);
                }
            }
            Action::Dialogs => {
                for kind in DIALOG_KINDS {
                    self.session.message_demo(kind).await;
                }
            }
            Action::Confirm => finish(self.session.confirm_demo().await)?,
            Action::Chain => finish(self.session.chained_demo().await)?,
            Action::Menu { id: Some(id) } => return self.menu(&id).await,
            Action::Menu { id: None } => print_menus(),
            Action::Window(action) => return self.window(action).await,
            Action::Repl => println!("already in the interactive session"),
        }
        Ok(Flow::Continue)
    }

    pub async fn repl(&self) -> Result<()> {
        println!("Type `help` for commands, `quit` to leave.");
        while let Some(line) = read_line("> ".to_string()).await? {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            let command = match ReplCommand::try_parse_from(words) {
                Ok(command) => command,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };

            let flow = match command {
                ReplCommand::Action(action) => self.run(action).await,
                ReplCommand::Edit { text } => {
                    self.session.edit(text.join(" ")).await;
                    Ok(Flow::Continue)
                }
                ReplCommand::Close => {
                    match self.session.close().await {
                        Some(handle) => println!("closed {}", describe(&handle)),
                        None => println!("no open buffer"),
                    }
                    Ok(Flow::Continue)
                }
                ReplCommand::View => {
                    print_view(&self.session.view().await);
                    Ok(Flow::Continue)
                }
                ReplCommand::Help => {
                    println!("{}", ReplCommand::command().render_help());
                    Ok(Flow::Continue)
                }
                ReplCommand::Quit => Ok(Flow::Quit),
            };

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => println!("error: {err:#}"),
            }
        }
        Ok(())
    }

    async fn preset(&self, path: Option<PathBuf>) {
        if let Some(path) = path {
            self.dialogs.preset(path).await;
        }
    }

    async fn open(&self) -> Result<Option<FileHandle>> {
        let opened = self.session.open().await.map_err(|reason| anyhow!(reason))?;
        match &opened {
            Some(handle) => {
                println!("opened {}", describe(handle));
                println!("{}", handle.content);
            }
            None => println!("cancelled"),
        }
        Ok(opened)
    }

    async fn menu(&self, id: &str) -> Result<Flow> {
        let handled = self.session.view().await.menu_selections;
        match self.bus.menu_selected(id) {
            MenuRoute::Quit => Ok(Flow::Quit),
            MenuRoute::Ignored => {
                println!("unknown menu item `{id}`");
                Ok(Flow::Continue)
            }
            MenuRoute::Emit(_) => {
                // The dialog is shown by the menu listener task.
                for _ in 0..100 {
                    if self.session.view().await.menu_selections > handled {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                Ok(Flow::Continue)
            }
        }
    }

    async fn window(&self, action: WindowAction) -> Result<Flow> {
        match action {
            WindowAction::Title { title } => self
                .session
                .set_window_title(&title.join(" "))
                .await
                .map_err(|reason| anyhow!(reason))?,
            WindowAction::Size { size } => {
                let size = self
                    .session
                    .set_window_size(&size)
                    .await
                    .map_err(|reason| anyhow!(reason))?;
                println!("window size: {size}");
            }
            WindowAction::Center => self
                .session
                .center_window()
                .await
                .map_err(|reason| anyhow!(reason))?,
            WindowAction::ToggleSecondary => {
                let visible = self
                    .session
                    .toggle_secondary()
                    .await
                    .map_err(|reason| anyhow!(reason))?;
                println!("secondary window {}", if visible { "shown" } else { "hidden" });
            }
            WindowAction::Close { label } => {
                if self.window.request_close(&label).await? {
                    println!("{label} window closed");
                } else {
                    println!("{label} window hidden; `window tray` brings it back");
                }
            }
            WindowAction::Tray { item: None } => {
                let command = self.window.tray_click().await?;
                println!("tray: {command:?}");
            }
            WindowAction::Tray { item: Some(item) } => match shell::route_tray_event(&item) {
                Some(TrayCommand::Quit) => return Ok(Flow::Quit),
                Some(command) => {
                    self.window.apply_tray(command).await?;
                    println!("tray: {command:?}");
                }
                None => println!("unknown tray item `{item}`"),
            },
            WindowAction::Show => {
                let geometry = self.window.geometry().await;
                println!(
                    "'{}' {}{}",
                    geometry.title,
                    geometry.size,
                    if geometry.centered { " centered" } else { "" }
                );
            }
        }
        Ok(Flow::Continue)
    }
}

/// Dialogs already acknowledged the outcome; a failure is also returned.
fn finish(report: WorkflowReport) -> Result<()> {
    tracing::debug!(id = %report.id, workflow = ?report.kind, state = ?report.state, "workflow report");
    match report.state {
        WorkflowState::Failed(reason) => Err(anyhow!(reason)),
        _ => Ok(()),
    }
}

fn describe(handle: &FileHandle) -> String {
    let name = handle
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "unsaved buffer".to_string());
    format!(
        "{name} ({} bytes{})",
        handle.content.len(),
        if handle.dirty { ", modified" } else { "" }
    )
}

fn print_menus() {
    for submenu in shell::app_menu() {
        println!("{}", submenu.label);
        for item in submenu.items {
            match item.accelerator {
                Some(accelerator) => println!("  {:<12} {} ({accelerator})", item.id, item.label),
                None => println!("  {:<12} {}", item.id, item.label),
            }
        }
    }
    println!("Tray");
    for item in shell::tray_menu() {
        println!("  {:<12} {}", item.id, item.label);
    }
}

fn print_statistics(stats: &Statistics) {
    println!(
        "sum: {}  average: {}  max: {}  min: {}",
        stats.sum, stats.average, stats.max, stats.min
    );
}

fn shown<T: std::fmt::Display>(value: &Option<Result<T, String>>) -> String {
    match value {
        Some(Ok(value)) => value.to_string(),
        Some(Err(reason)) => format!("error: {reason}"),
        None => "-".to_string(),
    }
}

fn print_view(view: &ViewState) {
    println!("greeting:      {}", shown(&view.greeting));
    println!("calculation:   {}", shown(&view.calculation));
    println!("division:      {}", shown(&view.division));
    match &view.statistics {
        Some(Ok(stats)) => print_statistics(stats),
        Some(Err(reason)) => println!("statistics:    error: {reason}"),
        None => println!("statistics:    -"),
    }
    println!(
        "timestamp:     {} {}",
        view.timestamp.map(|s| s.to_string()).unwrap_or_default(),
        view.local_time
    );
    println!("system info:   {}", view.system_info);
    println!(
        "window:        '{}' {} focused={} secondary={}",
        view.window_title,
        view.window_size.map(|s| s.to_string()).unwrap_or_default(),
        view.focused,
        view.secondary_visible
    );
    println!(
        "file:          {}{}",
        view.file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
        if view.file_dirty { " (modified)" } else { "" }
    );
    if let Some(listing) = &view.directory {
        println!(
            "directory:     {} ({} entries)",
            listing.root.display(),
            listing.entries.len()
        );
    }
    if let Some(exists) = view.path_exists {
        println!("path exists:   {exists}");
    }
    println!("permission:    {:?}", view.permission);
    if let Some(outcome) = &view.last_notification {
        println!("notification:  {outcome:?}");
    }
    if let Some(action) = &view.last_menu_action {
        println!("menu action:   {}", action.id());
    }
    if let Some((kind, state)) = &view.last_workflow {
        println!("workflow:      {kind:?} {state:?}");
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
