mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, config_dir};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker, queue_request};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use draco_api::DracoApi;
use log::{error, info, warn};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let overrides = match parse_cli_args(std::env::args().skip(1)) {
        Ok(CliAction::Run(overrides)) => overrides,
        Ok(CliAction::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(CliAction::Version) => {
            println!("draco {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    let mut settings = AppSettings::load();
    overrides.apply(&mut settings);
    if settings.account_id.trim().is_empty() {
        anyhow::bail!(
            "no account configured: set account_id in {}, DRACO_ACCOUNT_ID, or pass --account",
            config_dir().join("config.toml").display()
        );
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let client = DracoApi::new(settings.api_url.clone(), settings.account_id.clone());
    let refresh_period = Duration::from_secs(settings.refresh_secs);
    info!("using {} for account {}", settings.api_url, settings.account_id);

    let mut app = App::new(settings);
    app.restore_view();
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic reload of the visible window
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone(), refresh_period);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Trigger season load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct CliOverrides {
    api_url: Option<String>,
    account_id: Option<String>,
}

impl CliOverrides {
    fn apply(self, settings: &mut AppSettings) {
        if let Some(api_url) = self.api_url {
            settings.api_url = api_url;
        }
        if let Some(account_id) = self.account_id {
            settings.account_id = account_id;
        }
    }
}

#[derive(Debug, PartialEq)]
enum CliAction {
    Run(CliOverrides),
    Help,
    Version,
}

fn parse_cli_args(mut args: impl Iterator<Item = String>) -> Result<CliAction, String> {
    let mut overrides = CliOverrides::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "-a" | "--api" => {
                overrides.api_url = Some(args.next().ok_or("--api needs a URL")?);
            }
            "-A" | "--account" => {
                overrides.account_id = Some(args.next().ok_or("--account needs an id")?);
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }
    Ok(CliAction::Run(overrides))
}

fn usage_text() -> &'static str {
    "draco - league schedule manager for Draco Sports Manager

Usage:
  draco [--api URL] [--account ID]
  draco --help
  draco --version

Environment:
  DRACO_API_URL      Backend base URL (default http://localhost:3001)
  DRACO_ACCOUNT_ID   Account whose schedule is shown
  DRACO_TOKEN        Bearer token; required to create, edit or delete games
  DRACO_ROLES        Comma separated role names of the token's user
  DRACO_LOG          Log level: error, warn, info, debug or trace

Settings are read from $XDG_CONFIG_HOME/draco/config.toml (or ~/.config/draco)."
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let request = app.lock().await.start();
            queue_request(network_requests, Some(request)).await;
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
        }
        UiEvent::Resize => {}
        UiEvent::RefreshTick => {
            let request = app.lock().await.on_refresh_tick();
            queue_request(network_requests, request).await;
        }
    }
    true
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::StaticDataLoaded { season, leagues, fields } => {
            let request = app.lock().await.on_static_loaded(season, leagues, fields);
            queue_request(network_requests, request).await;
        }
        NetworkResponse::GamesLoaded { generation, window, games } => {
            app.lock().await.on_games_loaded(generation, window, games);
        }
        NetworkResponse::GamesFailed { generation, message } => {
            warn!("games load {generation} failed: {message}");
            app.lock().await.on_games_failed(generation, message);
        }
        NetworkResponse::MutationSucceeded { mutation } => {
            let request = app.lock().await.on_mutation_succeeded(mutation);
            queue_request(network_requests, request).await;
        }
        NetworkResponse::MutationFailed { mutation, error } => {
            warn!("{}: {error}", mutation.fallback_message());
            app.lock().await.on_mutation_failed(mutation, error);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            app.lock().await.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
