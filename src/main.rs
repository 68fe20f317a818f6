mod app;
mod backend;
mod board;
mod cli;
mod config;
mod error;
mod event;
mod model;
mod ui;

use std::io;
use std::panic;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{Action, App};
use board::BoardManager;

const LOG_ENV: &str = "BOARD_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_tui().await,
        Some("ls") | Some("list") => cli::handle_list(&args[1..]).await,
        Some("add") => cli::handle_add(&args[1..]).await,
        Some("mv") | Some("move") => cli::handle_move(&args[1..]).await,
        Some("edit") => cli::handle_edit(&args[1..]).await,
        Some("assign") => cli::handle_assign(&args[1..]).await,
        Some("rm") | Some("delete") => cli::handle_remove(&args[1..]).await,
        Some("help") | Some("-h") | Some("--help") => {
            cli::print_help();
            Ok(())
        }
        Some(other) => {
            cli::print_help();
            anyhow::bail!("Unknown command '{other}'")
        }
    }
}

/// Logs go to a file: the terminal belongs to the board.
fn init_tracing() -> Result<()> {
    let dir = config::data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join("board.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

async fn run_tui() -> Result<()> {
    // Load config
    let config = config::load_config()?;

    let backend = backend::create_backend(&config)?;
    let actors = backend::create_actor_source(&config);
    let board = BoardManager::new(backend, actors);

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app
    let mut app = App::new(board, action_tx.clone());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Spawn event reader
    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    // Initial fetch
    app.refresh().await;

    // Main loop
    loop {
        // Render
        terminal.draw(|f| ui::render(f, &app))?;

        // Wait for action
        if let Some(action) = action_rx.recv().await {
            app.update(action).await;
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
