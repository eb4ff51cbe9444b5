//! LeadPilot TUI entry point.

use leadpilot_query::QueryCache;
use leadpilot_tui::api_client::ApiClient;
use leadpilot_tui::config::TuiConfig;
use leadpilot_tui::error::TuiError;
use leadpilot_tui::events::TuiEvent;
use leadpilot_tui::persistence;
use leadpilot_tui::queries::AppCache;
use leadpilot_tui::state::App;
use leadpilot_tui::telemetry;
use leadpilot_tui::views::render_view;
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    run().await?;
    Ok(())
}

async fn run() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init_tracing(&config)?;

    if let Some(token) = token_from_args() {
        persistence::save_token(&config.token_path, &token)?;
        info!(path = %config.token_path.display(), "Stored access token");
    }
    let token = persistence::load_token(&config.token_path)?;
    if token.is_none() {
        warn!("No access token stored; authenticated requests will fail");
    }
    let api = ApiClient::from_config(&config, token.as_deref())?;
    let cache: AppCache = QueryCache::new(config.cache_config());

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let mut app = App::new(config, api, cache, event_tx.clone());
    match persistence::load(&app.config.state_path) {
        Ok(Some(state)) => app.restore(&state),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "Ignoring unreadable UI state"),
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx);

    let mut ticker = tokio::time::interval(Duration::from_millis(app.config.refresh_interval_ms));
    let poll_every = Duration::from_millis(app.config.usage_poll_interval_ms);
    let mut usage_poll = tokio::time::interval_at(tokio::time::Instant::now() + poll_every, poll_every);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                handle_event(&mut app, TuiEvent::Tick);
            }
            _ = usage_poll.tick() => {
                handle_event(&mut app, TuiEvent::UsagePoll);
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, event) {
                    break;
                }
            }
        }
    }

    let stats = app.cache.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        loads_started = stats.loads_started,
        loads_discarded = stats.loads_discarded,
        loads_abandoned = stats.loads_abandoned,
        "Shutting down"
    );
    persistence::save(&app.config.state_path, &app.persisted_state())?;
    Ok(())
}

fn handle_event(app: &mut App, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Input(key) => return app.handle_key(key),
        TuiEvent::Tick => app.tick(chrono::Utc::now()),
        TuiEvent::UsagePoll => app.poll_usage(),
        TuiEvent::QueryUpdated { key, error } => app.handle_query_update(&key, error),
        TuiEvent::MutationFinished { label, result } => {
            app.handle_mutation_finished(label, result)
        }
        TuiEvent::Resize { .. } => {}
    }
    false
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

/// `--token <value>` stores a new access token before starting.
fn token_from_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--token" {
            return args.next().filter(|t| !t.trim().is_empty());
        }
    }
    None
}
