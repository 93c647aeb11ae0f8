//! AI Chatbot
//!
//! Entry point for both the terminal client and the chat service.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::map_err_ignore)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::unused_async)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ai_chatbot::chat::{ChatTransport, ChatView, HttpChatClient};
use ai_chatbot::config::{AppConfig, Cli, Command};
use ai_chatbot::llm::Orchestrator;
use ai_chatbot::{server, tui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present); failures are reported once logging is up
    let dotenv_error = dotenv_failure(dotenv());

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::from_cli(&cli).context("Configuration error")?);
    let command = cli.command();

    match command {
        Command::Serve { .. } => init_stdout_tracing(),
        Command::Chat { .. } => init_file_tracing(&config.client.log_file)?,
    }

    if let Some(e) = dotenv_error {
        tracing::warn!(name: "config.dotenv.failed", error = %e, "Failed to load .env file");
    }

    match command {
        Command::Serve { .. } => {
            let settings = config.llm.settings().context("Configuration error")?;
            server::start_server(config, Orchestrator::new(settings)).await
        }
        Command::Chat { .. } => run_client(&config).await,
    }
}

/// A missing `.env` is normal; anything else is worth a warning.
fn dotenv_failure(result: dotenvy::Result<PathBuf>) -> Option<dotenvy::Error> {
    result.err().filter(|e| !e.not_found())
}

async fn run_client(config: &AppConfig) -> anyhow::Result<()> {
    let client = HttpChatClient::new(&config.client.endpoint)
        .with_context(|| format!("Invalid chat endpoint: {}", config.client.endpoint))?;
    let view = ChatView::new().with_theme(config.client.theme);
    info!(
        name: "chat.client.starting",
        endpoint = %client.endpoint(),
        conversation_id = %view.conversation_id(),
        "Chat client starting"
    );

    let transport: Arc<dyn ChatTransport> = Arc::new(client);
    let view = tui::run(view, transport).await?;

    info!(
        name: "chat.client.stopped",
        messages = view.history().len(),
        "Chat client stopped"
    );
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing on stdout (M-LOG-STRUCTURED)
fn init_stdout_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter())
        .init();
}

/// Initialize tracing into `path`; the terminal is owned by the UI.
fn init_file_tracing(path: &str) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {path}"))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_dotenv_is_silent() {
        let result = dotenvy::from_path("/nonexistent/.env").map(|()| PathBuf::new());
        assert!(dotenv_failure(result).is_none());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NOT A VALID LINE").unwrap();

        let result = dotenvy::from_path(file.path()).map(|()| file.path().to_path_buf());
        assert!(dotenv_failure(result).is_some());
    }
}
