//! `TermTask` — terminal task tracker.
//!
//! Launches the TUI and connects to the task service. Configuration via
//! CLI flags, environment variables, or config file
//! (`~/.config/termtask/config.toml`).
//!
//! ```bash
//! # Against a local server
//! cargo run --bin termtask -- --api-url http://127.0.0.1:8787
//!
//! # Or via environment variable
//! TERMTASK_API_URL=http://127.0.0.1:8787 cargo run --bin termtask
//! ```

use std::io;
use std::path::Path;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use termtask::app::{App, AppAction};
use termtask::config::{CliArgs, ClientConfig};
use termtask::net::{self, NetCommand, NetConfig, NetEvent};
use termtask::notify::{Notice, NoticeCenter};
use termtask::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("termtask starting");

    // Build networking config from resolved settings.
    let net_config = match config.to_net_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, net_config, &config).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("termtask exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the
/// terminal). Returns a [`WorkerGuard`] that must be held until
/// shutdown to ensure all buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("termtask.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    net_config: Option<NetConfig>,
    client_config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new(NoticeCenter::new(client_config.notice_ttl))
        .with_timestamp_format(&client_config.timestamp_format);

    // Connect to the task service if a base URL is configured.
    let (cmd_tx, mut evt_rx): (Option<mpsc::Sender<NetCommand>>, Option<mpsc::Receiver<NetEvent>>) =
        match net_config {
            Some(config) => match net::spawn_net(config).await {
                Ok((tx, rx)) => (Some(tx), Some(rx)),
                Err(e) => {
                    app.notices
                        .push(Notice::error(format!("Offline: {e}")), Instant::now());
                    (None, None)
                }
            },
            None => {
                app.notices.push(
                    Notice::info("No API base URL configured; pass --api-url or set TERMTASK_API_URL"),
                    Instant::now(),
                );
                (None, None)
            }
        };

    loop {
        // Drain networking events before drawing.
        if let Some(rx) = evt_rx.as_mut() {
            while let Ok(evt) = rx.try_recv() {
                app.apply_event(evt, Instant::now());
            }
        }
        app.tick(Instant::now());

        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(client_config.poll_timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.handle_key_event(key) {
                AppAction::Command(cmd) => {
                    if let Some(ref tx) = cmd_tx {
                        if tx.try_send(cmd).is_err() {
                            tracing::warn!("networking command channel full or closed");
                        }
                    } else {
                        app.notices
                            .push(Notice::error("Not connected to a task service"), Instant::now());
                    }
                }
                AppAction::Quit | AppAction::None => {}
            }
        }

        if app.should_quit {
            if let Some(ref tx) = cmd_tx {
                let _ = tx.try_send(NetCommand::Shutdown);
            }
            break;
        }
    }

    Ok(())
}
