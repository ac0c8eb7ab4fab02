use anyhow::{Context, Result};
use crate::ask::{AskBackend, HttpAskClient};
use crate::config::Config;
use crate::conversation::{ConversationController, RetrievalWidth};
use std::path::Path;

/// One-shot question: runs a single turn and prints the assistant reply.
///
/// Returns `false` when the reply is an error message.
pub async fn ask_once(config: &Config, question: &str, top_k: Option<RetrievalWidth>) -> Result<bool> {
    let client = HttpAskClient::new(&config.base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;
    let mut controller = ConversationController::new(top_k.unwrap_or(config.default_top_k));

    let (text, is_error) = run_turn(&mut controller, question, &client).await?;
    if is_error {
        eprintln!("❌ {}", text);
    } else {
        println!("{}", text);
    }
    Ok(!is_error)
}

/// Run one turn and return the assistant's `(text, is_error)`
async fn run_turn(
    controller: &mut ConversationController,
    question: &str,
    backend: &dyn AskBackend,
) -> Result<(String, bool)> {
    if !controller.submit(question, backend).await {
        anyhow::bail!("Question must not be empty");
    }
    let last = controller
        .messages()
        .last()
        .context("Conversation log is empty")?;
    Ok((last.text.clone(), last.is_error))
}

/// Print the effective configuration, optionally writing the defaults first
pub fn show_config(config: &Config, path: &Path, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            println!("⚠️  Config already exists at {}", path.display());
        } else {
            Config::default().save_to(path)?;
            println!("✨ Wrote default config to {}", path.display());
        }
    }

    println!("📍 Config file: {}", path.display());
    println!("{}", "=".repeat(50));
    print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}
