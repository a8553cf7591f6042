//! Registrar TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use registrar_core::{RecordGateway, ValidationTicket};
use registrar_tui::api_client::HttpGateway;
use registrar_tui::config::TuiConfig;
use registrar_tui::error::TuiError;
use registrar_tui::events::TuiEvent;
use registrar_tui::keys::map_key;
use registrar_tui::logging::init_logging;
use registrar_tui::persistence;
use registrar_tui::state::App;
use registrar_tui::views::render_view;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    init_logging(&config.log_path)?;
    info!(api = %config.api_base_url, "Starting registrar");

    let gateway: Arc<dyn RecordGateway> = Arc::new(HttpGateway::new(&config)?);
    let mut app = App::new(config, gateway)?;
    match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => app.restore(&state)?,
        Ok(None) => {}
        Err(err) => warn!(error = %err, "Ignoring unreadable UI state"),
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    app.refresh().await;

    let tick_rate = Duration::from_millis(app.config.tick_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick(Instant::now()),
            Some(event) = event_rx.recv() => handle_event(&mut app, event, &event_tx).await,
        }

        if app.should_quit {
            break;
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted()) {
        warn!(error = %err, "Failed to save UI state");
    }
    info!("Registrar stopped");
    Ok(())
}

async fn handle_event(app: &mut App, event: TuiEvent, sender: &mpsc::Sender<TuiEvent>) {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key, app.input_mode()) {
                let tickets = app.handle_action(action, Instant::now()).await;
                for ticket in tickets {
                    spawn_validation(app, ticket, sender.clone());
                }
            }
        }
        TuiEvent::Validated {
            page,
            ticket,
            verdict,
        } => app.apply_verdict(page, &ticket, verdict),
        TuiEvent::Tick => app.on_tick(Instant::now()),
        TuiEvent::Resize { .. } => {}
    }
}

/// Run a validator off the event loop; the verdict comes back as an event.
fn spawn_validation(app: &App, ticket: ValidationTicket, sender: mpsc::Sender<TuiEvent>) {
    let page = app.page.generation;
    let validators = Arc::clone(&app.validators);
    let gateway = Arc::clone(&app.gateway);
    tokio::spawn(async move {
        let verdict = ticket.run(&validators, gateway.as_ref()).await;
        let _ = sender
            .send(TuiEvent::Validated {
                page,
                ticket,
                verdict,
            })
            .await;
    });
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
