//! Navi CLI - print captured threads and fetched objects

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use navi_core::config::Config;
use navi_core::fetch::{Fetcher, HttpFetcher, Snapshot, Source};
use navi_core::navigator::{LazyExpander, Navigator, Trigger};
use navi_core::path::RefPath;
use navi_core::visualization::{NodeStyle, NodeView, RenderOptions};
use serde_json::json;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "navi")]
#[command(author, version, about = "Browse captured threads, frames and objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the forest comes from
#[derive(Args, Debug, Clone, Default)]
struct SourceArgs {
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

#[derive(Subcommand)]
enum Commands {
    /// Print threads and the frames of the selected thread
    Tree {
        #[command(flatten)]
        source: SourceArgs,

        /// Thread to select (0-based; defaults to the first)
        #[arg(short, long)]
        thread: Option<usize>,

        /// Show frames of every thread
        #[arg(short, long)]
        all: bool,

        /// Show unabridged type and function names
        #[arg(long)]
        full_names: bool,

        /// Use ASCII tree characters
        #[arg(long)]
        ascii: bool,
    },

    /// Fetch one value by path and print it
    Fetch {
        /// Path to fetch, e.g. /t/0/1/this
        path: String,

        /// Offline capture to fetch from
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,

        /// Data source base URL (overrides source.base_url)
        #[arg(long)]
        url: Option<String>,

        /// Show unabridged type names
        #[arg(long)]
        full_names: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Open the interactive browser
    Browse {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("navi=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tree {
            source,
            thread,
            all,
            full_names,
            ascii,
        } => {
            let view = TreeView {
                thread,
                all,
                full_names,
                ascii,
            };
            cmd_tree(source, view, cli.format).await
        }

        Commands::Fetch {
            path,
            snapshot,
            url,
            full_names,
        } => cmd_fetch(&path, snapshot, url, full_names, cli.format).await,

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Browse { source } => cmd_browse(source, cli.quiet),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Load configuration, applying a command-line base URL
fn load_config(url: Option<String>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = url {
        config.set("source.base_url", &url)?;
    }
    Ok(config)
}

fn render_options(config: &Config, full_names: bool, ascii: bool) -> anyhow::Result<RenderOptions> {
    let mut options = config.render_options()?;
    if full_names {
        options = options.with_full_names(true);
    }
    if ascii {
        options = options.with_style(NodeStyle::Ascii);
    }
    Ok(options)
}

/// Attach the error code and a hint to a core error
fn with_hint(err: navi_core::Error) -> anyhow::Error {
    let message = match err.suggestion() {
        Some(hint) => format!("[{}] {}\n  hint: {}", err.code(), err, hint),
        None => format!("[{}] {}", err.code(), err),
    };
    anyhow::anyhow!(message)
}

// ============================================================================
// Command Implementations
// ============================================================================

struct TreeView {
    thread: Option<usize>,
    all: bool,
    full_names: bool,
    ascii: bool,
}

async fn cmd_tree(source: SourceArgs, view: TreeView, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(source.url)?;
    let options = render_options(&config, view.full_names, view.ascii)?;

    let (forest, fetcher) = Source::from_args(source.forest, source.snapshot)
        .open(&config.source)
        .await
        .map_err(with_hint)?;
    debug!(source = %fetcher.describe(), frames = forest.frame_count(), "Forest ready");

    let mut nav = Navigator::new(&forest);
    if let Some(index) = view.thread {
        if index >= nav.forest().threads.len() {
            anyhow::bail!(
                "Thread {} does not exist ({} threads captured)",
                index,
                nav.forest().threads.len()
            );
        }
        nav.select(index, Trigger::Keyboard);
    }

    match format {
        OutputFormat::Json => {
            let output = json!({
                "selected": nav.selection().selected(),
                "threads": nav.forest().threads,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            let text = if view.all {
                nav.forest().render_text(&options, |_| true)
            } else {
                nav.render_text(&options)
            };
            print!("{}", text);
        }
    }
    Ok(())
}

async fn cmd_fetch(
    path: &str,
    snapshot: Option<PathBuf>,
    url: Option<String>,
    full_names: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(url)?;
    let options = render_options(&config, full_names, false)?;

    let fetcher: Arc<dyn Fetcher> = match snapshot {
        Some(file) => Arc::new(Snapshot::load(&file).await.map_err(with_hint)?.into_parts().1),
        None => Arc::new(
            HttpFetcher::builder()
                .config(&config.source)
                .build()
                .map_err(with_hint)?,
        ),
    };

    let (expander, _completions) = LazyExpander::new(fetcher);
    info!(path, source = %expander.describe(), "Fetching");
    let expansion = expander.expand(RefPath::new(path)).await;
    let node = expansion.result.map_err(with_hint)?;
    let view = NodeView::render(expansion.path, node);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => print!("{}", view.render_text(&options)),
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Arguments passed through to the TUI binary
fn browse_args(source: &SourceArgs) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(forest) = &source.forest {
        args.push("--forest".to_string());
        args.push(forest.display().to_string());
    }
    if let Some(snapshot) = &source.snapshot {
        args.push("--snapshot".to_string());
        args.push(snapshot.display().to_string());
    }
    if let Some(url) = &source.url {
        args.push("--url".to_string());
        args.push(url.clone());
    }
    args
}

fn cmd_browse(source: SourceArgs, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        info!("Starting browser...");
    }

    let result = std::process::Command::new("navi-tui")
        .args(browse_args(&source))
        .status();

    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => anyhow::bail!("navi-tui exited with {}", status),
        Err(_) => {
            if !quiet {
                println!("Could not start the browser.");
                println!();
                println!("The binary 'navi-tui' is not in your PATH.");
                println!("Either:");
                println!("  1. Add the target/debug or target/release directory to PATH");
                println!("  2. Run `cargo run --bin navi-tui` from the project root");
                println!("  3. Install with `cargo install --path crates/navi-tui`");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tree_flags() {
        let cli = Cli::parse_from([
            "navi", "--format", "json", "tree", "--snapshot", "cap.json", "--thread", "2", "--ascii",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Tree {
            source,
            thread,
            ascii,
            all,
            ..
        } = cli.command
        else {
            panic!("expected tree");
        };
        assert_eq!(source.snapshot, Some(PathBuf::from("cap.json")));
        assert_eq!(thread, Some(2));
        assert!(ascii);
        assert!(!all);
    }

    #[test]
    fn test_browse_args_passthrough() {
        let source = SourceArgs {
            forest: Some("page.html".into()),
            snapshot: None,
            url: Some("http://device:8080".into()),
        };
        assert_eq!(
            browse_args(&source),
            vec!["--forest", "page.html", "--url", "http://device:8080"]
        );
        assert!(browse_args(&SourceArgs::default()).is_empty());
    }

    #[test]
    fn test_render_options_flags_override_config() {
        let config = Config::default();
        let options = render_options(&config, true, true).unwrap();
        assert!(options.full_names);
        assert_eq!(options.style, NodeStyle::Ascii);

        let options = render_options(&config, false, false).unwrap();
        assert!(!options.full_names);
        assert_eq!(options.style, NodeStyle::Unicode);
    }

    #[test]
    fn test_with_hint_includes_code() {
        let err = with_hint(navi_core::Error::PathNotFound("/t/0/0/x".into()));
        let message = err.to_string();
        assert!(message.starts_with("[E103]"));
        assert!(message.contains("hint:"));
    }
}
