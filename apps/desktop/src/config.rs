use std::{fmt, fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use orchestrator::SessionSettings;
use platform::PermissionMode;
use shared::domain::WindowSize;

pub const DEFAULT_CONFIG_FILE: &str = "desktop.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct DesktopSettings {
    pub window_title: String,
    pub window_size: WindowSize,
    pub notification_permission: PermissionMode,
    pub chain_delay_ms: u64,
    pub default_save_name: String,
    pub assume_yes: bool,
    pub log_filter: String,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            window_title: "Main Window".into(),
            window_size: WindowSize::new(1200, 800),
            notification_permission: PermissionMode::Prompt,
            chain_delay_ms: 1000,
            default_save_name: "untitled.txt".into(),
            assume_yes: false,
            log_filter: "info".into(),
        }
    }
}

impl DesktopSettings {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            chain_delay: Duration::from_millis(self.chain_delay_ms),
            default_save_name: self.default_save_name.clone(),
            window_title: self.window_title.clone(),
            window_size: self.window_size,
        }
    }

    /// Sets one key from its textual form. Unknown keys are ignored.
    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "window_title" => self.window_title = value.to_string(),
            "window_size" => self.window_size = value.parse()?,
            "notification_permission" => {
                self.notification_permission = value.parse().map_err(|err| format!("{err}"))?
            }
            "chain_delay_ms" => {
                self.chain_delay_ms = value.trim().parse().map_err(|err| format!("{err}"))?
            }
            "default_save_name" => {
                if value.trim().is_empty() {
                    return Err("must not be empty".into());
                }
                self.default_save_name = value.trim().to_string();
            }
            "assume_yes" => {
                self.assume_yes = value.trim().parse().map_err(|err| format!("{err}"))?
            }
            "log_filter" => self.log_filter = value.to_string(),
            _ => {}
        }
        Ok(())
    }
}

const KEYS: [&str; 7] = [
    "window_title",
    "window_size",
    "notification_permission",
    "chain_delay_ms",
    "default_save_name",
    "assume_yes",
    "log_filter",
];

/// A configuration value that could not be used; the previous value stays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub source: String,
    pub key: String,
    pub reason: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`: {}", self.source, self.key, self.reason)
    }
}

/// Defaults, then the TOML file, then `DESKTOP_*` and `APP__*` variables.
///
/// `path` must exist when given; the default `desktop.toml` is optional.
/// Warnings are returned rather than logged since logging is configured
/// from the result.
pub fn load_settings(path: Option<&Path>) -> Result<(DesktopSettings, Vec<ConfigWarning>)> {
    let mut settings = DesktopSettings::default();
    let mut warnings = Vec::new();

    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        let source = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        apply_file(&mut settings, &raw, &source, &mut warnings)?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok(), &mut warnings);
    Ok((settings, warnings))
}

fn apply_file(
    settings: &mut DesktopSettings,
    raw: &str,
    source: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<()> {
    let table = toml::from_str::<toml::Table>(raw)
        .with_context(|| format!("failed to parse config {source}"))?;
    for (key, value) in table {
        let text = match value {
            toml::Value::String(text) => text,
            other => other.to_string(),
        };
        if let Err(reason) = settings.set(&key, &text) {
            warnings.push(ConfigWarning {
                source: source.to_string(),
                key,
                reason,
            });
        }
    }
    Ok(())
}

fn apply_env<F>(settings: &mut DesktopSettings, lookup: F, warnings: &mut Vec<ConfigWarning>)
where
    F: Fn(&str) -> Option<String>,
{
    for key in KEYS {
        let upper = key.to_ascii_uppercase();
        for name in [format!("DESKTOP_{upper}"), format!("APP__{upper}")] {
            let Some(value) = lookup(&name) else {
                continue;
            };
            if let Err(reason) = settings.set(key, &value) {
                warnings.push(ConfigWarning {
                    source: name,
                    key: key.to_string(),
                    reason,
                });
            }
        }
    }
}
