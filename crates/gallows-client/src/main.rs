mod app;
mod event;
mod input;
mod network;
mod ui;

use std::io;

use clap::Parser;
use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use uuid::Uuid;

use crate::ui::connect::ConnectScreen;

/// Gallows Client - multiplayer hangman in the terminal
#[derive(Parser, Debug)]
#[command(name = "gallows-client", version, about)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:9876")]
    server: String,

    /// Player name. Connects right away when given.
    #[arg(short, long)]
    name: Option<String>,

    /// Room code to join (or show, with --tv) after connecting
    #[arg(short, long)]
    room: Option<String>,

    /// Stable player id to reuse across sessions
    #[arg(long)]
    identity: Option<Uuid>,

    /// Run as the shared TV display: creates a room unless --room is given
    #[arg(long)]
    tv: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallows_client=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let autoconnect = args.name.is_some() || args.tv;
    let name = args
        .name
        .unwrap_or_else(|| if args.tv { "TV".to_string() } else { String::new() });
    let connect = ConnectScreen::new(
        args.server,
        name,
        args.room.unwrap_or_default(),
        args.tv,
    );
    let app = app::App::new(connect, args.identity);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app::run(&mut terminal, app, autoconnect).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}
