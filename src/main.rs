mod action;
mod api;
mod app;
mod dispatch;
mod error;
mod event;
mod state;
mod tui;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use action::Action;
use api::client::HttpBackend;
use app::App;
use dispatch::Location;
use event::{Event, EventHandler};
use state::history::History;
use state::persistence::{self, AppConfig};

#[derive(Parser)]
#[command(name = "muncher", about = "Briefing dashboard in the terminal", version)]
struct Cli {
    /// Dashboard server URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Open this briefing on startup instead of the last one viewed
    #[arg(long)]
    briefing: Option<String>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here instead of ~/.config/muncher/muncher.log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = persistence::ensure_config_dir();
    init_logging(&cli.log_file.unwrap_or_else(persistence::default_log_path))?;

    let config_path = cli.config.unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load_from(&config_path);
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    let backend = HttpBackend::new(&config.server.base_url)
        .with_context(|| format!("invalid server URL {}", config.server.base_url))?;
    info!(server = %backend.base_url(), "starting");

    let history_path = History::history_path();
    let history = History::load_from(&history_path);
    let tick_rate = config.ui.tick_rate();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(action_tx, config, Arc::new(backend)).with_history(history, history_path);
    let mut events = EventHandler::new(tick_rate);

    app.request_categories();

    // Open the requested briefing, or the last one viewed
    let initial = cli
        .briefing
        .or_else(|| app.history.last_opened().map(str::to_string));
    if let Some(id) = initial {
        let _ = app
            .action_tx
            .send(Action::Navigate(Location::BriefingDetail(id)));
    }

    // Initial render
    terminal.draw(|frame| ui::render(frame, &mut app))?;

    loop {
        if !app.running {
            break;
        }

        tokio::select! {
            Some(event) = events.next() => {
                let action = match event {
                    Event::Tick => Some(Action::Tick),
                    Event::Resize => Some(Action::Render),
                    Event::Key(key) => map_key_to_action(&app, key.modifiers, key.code),
                };

                if let Some(action) = action {
                    app.update(action);
                    terminal.draw(|frame| ui::render(frame, &mut app))?;
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
                terminal.draw(|frame| ui::render(frame, &mut app))?;
            }
        }
    }

    info!("shutting down");
    tui::restore()?;
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(())
}

fn map_key_to_action(app: &App, modifiers: KeyModifiers, code: KeyCode) -> Option<Action> {
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if app.picker.is_some() {
        return match code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Enter => Some(Action::PickerSubmit),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PickerUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::PickerDown),
            _ => None,
        };
    }

    if app.show_help {
        return match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::ShowHelp),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::NavigateUp),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::NavigateDown),
        KeyCode::Char('?') => Some(Action::ShowHelp),
        KeyCode::Char('p') => Some(Action::PollNow),
        KeyCode::Char('b') => Some(Action::GenerateBriefing),
        KeyCode::Char('c') | KeyCode::Enter => Some(Action::OpenCategoryPicker),
        KeyCode::Char('f') => Some(Action::CycleFilter),
        KeyCode::Char('r') => Some(Action::Reload),
        _ => None,
    }
}
