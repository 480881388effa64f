//! Navi TUI - browse captured threads interactively
//!
//! This TUI shows:
//! - Thread headings (click, hover or h/l to select)
//! - Frames and slots of the selected thread
//! - Stacked overlays of fetched objects, sequences and values

mod app;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use navi_core::config::Config;
use navi_core::fetch::Source;
use navi_core::navigator::Expansion;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::info;

use app::App;

#[derive(Parser)]
#[command(name = "navi-tui")]
#[command(author, version, about = "Interactive browser for captured threads", long_about = None)]
struct Args {
    /// Forest JSON, or a saved page embedding one in #forest
    #[arg(long, value_name = "FILE")]
    forest: Option<PathBuf>,

    /// Offline capture holding the forest and node payloads
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Data source base URL (overrides source.base_url)
    #[arg(long)]
    url: Option<String>,
}

/// Log to a file so the terminal surface stays clean
fn init_logging() -> anyhow::Result<()> {
    let dir = Config::config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let path = dir.join("navi-tui.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("navi=info".parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(url) = &args.url {
        config.set("source.base_url", url)?;
    }
    init_logging()?;

    // Load before touching the terminal so a bad forest is reported plainly
    let (forest, fetcher) = Source::from_args(args.forest, args.snapshot)
        .open(&config.source)
        .await
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))?;
    info!(threads = forest.len(), source = %fetcher.describe(), "Starting browser");
    let (app, completions) = App::new(&forest, fetcher, &config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, app, completions).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut completions: mpsc::UnboundedReceiver<Expansion>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();

    while !app.should_quit() {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => app.handle_event(event),
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
            Some(expansion) = completions.recv() => app.on_expansion(expansion),
        }
    }

    info!("Browser closed");
    Ok(())
}
