//! # waldo-agent
//!
//! Waldo agent server binary — wires settings, relay, provider, controller,
//! and the WebSocket server together.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use waldo_llm::{AnthropicConfig, AnthropicProvider};
use waldo_relay::CommandRelay;
use waldo_runtime::{Controller, ControllerConfig};
use waldo_server::AppState;
use waldo_settings::WaldoSettings;
use waldo_tools::SessionDefaults;

/// System prompt sent with every model request.
const SYSTEM_PROMPT: &str = "You are Waldo, an assistant embodied in a \
    mobile robot. You perceive and act only through your tools; never claim \
    to have seen or done something without a tool result backing it. Keep \
    spoken responses short.";

/// Waldo agent server.
#[derive(Parser, Debug)]
#[command(name = "waldo-agent", about = "Waldo agent server")]
struct Cli {
    /// Port to bind (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file.
    #[arg(long, default_value_os_t = default_settings_path())]
    settings: PathBuf,

    /// Log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn default_settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".waldo").join("settings.json")
}

fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

fn build_provider(settings: &WaldoSettings) -> Result<AnthropicProvider> {
    if settings.model.provider != "anthropic" {
        anyhow::bail!(
            "unsupported model provider '{}'; only 'anthropic' is supported",
            settings.model.provider
        );
    }
    let api_key = settings
        .model
        .api_key
        .clone()
        .context("no API key configured; set WALDO_API_KEY or model.apiKey")?;
    let mut config = AnthropicConfig::new(api_key, settings.model.model.clone());
    config.base_url = settings.model.base_url.clone();
    config.max_tokens = settings.model.max_tokens;
    config.system_prompt = Some(SYSTEM_PROMPT.to_string());
    Ok(AnthropicProvider::new(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let settings = waldo_settings::load_from_path(&args.settings)
        .with_context(|| format!("failed to load settings from {}", args.settings.display()))?;
    let port = args.port.unwrap_or(settings.server.port);

    let relay = Arc::new(CommandRelay::new());
    let provider = Arc::new(build_provider(&settings)?);
    let controller = Arc::new(Controller::new(
        provider,
        Arc::clone(&relay),
        ControllerConfig {
            max_iterations: settings.agent.max_iterations,
            command_timeout_ms: settings.agent.command_timeout_ms,
            defaults: SessionDefaults {
                head_camera: settings.sources.head_camera,
                wrist_camera: settings.sources.wrist_camera,
            },
        },
    ));

    let router = waldo_server::build_router(AppState::new(relay, controller));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!(port, model = %settings.model.model, "waldo-agent ready");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
