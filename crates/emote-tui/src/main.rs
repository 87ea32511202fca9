mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use emote_core::{ChatClient, Config};

use app::App;
use tui::{EventHandler, Tui};

fn open_log_file(log_dir: &Path) -> Result<File> {
    fs::create_dir_all(log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("emote-chat.log"))?;
    Ok(log_file)
}

/// Send tracing output to a log file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let Some(cache_dir) = dirs::cache_dir() else {
        return Ok(());
    };
    let log_file = open_log_file(&cache_dir.join("emote-chat"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("emote_core=info,emote_chat=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // The chat works without a log; the terminal is still ours to print on here
    if let Err(e) = init_logging() {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::default()
    });
    let endpoint = config.endpoint().to_string();
    tracing::info!(endpoint = %endpoint, "starting emote-chat");

    let client = ChatClient::new(&endpoint);
    let mut app = App::new(Arc::new(client), &endpoint);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if let Some(task) = app.send_task.take() {
        task.abort();
    }
    result
}
