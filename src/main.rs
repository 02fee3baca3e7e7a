mod app;
mod config;
mod enhancer;
mod error;
mod gemini;
mod handler;
mod logging;
mod tui;
mod ui;

use std::sync::Arc;

use anyhow::Result;

use app::App;
use config::Config;
use enhancer::Enhancer;
use gemini::GeminiClient;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is loaded before logging so RUST_LOG / LOG_FILE can come from it
    let config = Config::from_env();
    logging::init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting prompt enhancer");
    if let Some(path) = &config.env_file {
        tracing::info!(path = %path.display(), "loaded .env");
    }
    if !config.has_api_key() {
        tracing::warn!(
            var = config::API_KEY_VAR,
            "API key is not set; requests will be rejected by the service"
        );
    }

    let client = GeminiClient::new(config.api_key.clone());
    let mut app = App::new(&config, Enhancer::new(Arc::new(client)));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    if let Err(err) = &result {
        tracing::error!(error = %err, "exiting with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    tracing::info!(busy = app.is_busy, "shutting down");
    Ok(())
}
