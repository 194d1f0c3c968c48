mod app;
mod cli;
mod config;
mod dialogs;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    cli::{Action, Args},
    config::load_settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (settings, warnings) = load_settings(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    for warning in &warnings {
        tracing::warn!(%warning, "ignoring configuration value");
    }

    let app = App::build(&settings, args.yes || settings.assume_yes);
    tracing::info!(title = %settings.window_title, "desktop session started");

    let result = match args.action.unwrap_or(Action::Repl) {
        Action::Repl => app.repl().await,
        action => app.run(action).await.map(|_| ()),
    };

    app.shutdown().await;
    tracing::info!("desktop session ended");
    result
}
