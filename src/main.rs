use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

mod app;
mod ask;
mod commands;
mod config;
mod conversation;
mod events;
mod tui;
mod ui;

use ask::HttpAskClient;
use config::Config;
use conversation::RetrievalWidth;

#[derive(Parser)]
#[command(name = "sebi-assist")]
#[command(version)]
#[command(about = "Chat with the SEBI cybersecurity assistant", long_about = None)]
struct Cli {
    /// Base URL of the question-answering service
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        question: String,
        /// Number of sources to consult (2, 4, 6 or 8)
        #[arg(short = 'k', long)]
        top_k: Option<RetrievalWidth>,
    },
    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    config.resolve_base_url(cli.base_url, Config::base_url_from_env());

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            init_file_logging()?;
            run_chat(config).await
        }
        Commands::Ask { question, top_k } => {
            init_stderr_logging();
            if !commands::ask_once(&config, &question, top_k).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config { init } => commands::show_config(&config, &config_path, init),
    }
}

async fn run_chat(config: Config) -> Result<()> {
    let client = HttpAskClient::new(&config.base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;
    let endpoint = client.endpoint().to_string();
    let mut app = app::App::new(&config, Arc::new(client), &endpoint);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal, &config).await;
    tui::restore()?;

    tracing::info!(
        messages = app.manager().controller().messages().len(),
        "conversation closed"
    );
    result
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The TUI owns the terminal, so logs go to `~/.sebi-assist/sebi-assist.log`
fn init_file_logging() -> Result<()> {
    let dir = Config::home_dir()?;
    fs::create_dir_all(&dir).context("Failed to create .sebi-assist directory")?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("sebi-assist.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::info!("Starting sebi-assist v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
