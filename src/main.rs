use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use roompanel::config::Config;
use roompanel::graph::{Credentials, GraphAuthenticator};
use roompanel::serial::Channel;
use roompanel::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let config_path = parse_config_path();
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let serial = match Channel::open(&config) {
        Ok(mut channel) => {
            tracing::info!("Serial port initialized successfully.");
            tracing::info!("Running startup commands...");
            channel.run_startup_commands(&config.startup_commands);
            Some(channel)
        }
        Err(err) => {
            tracing::warn!("Failed to initialize serial port: {}", err);
            tracing::warn!("Startup commands skipped because the serial port is not initialized.");
            None
        }
    };

    let auth = match Credentials::from_env() {
        Ok(credentials) => Some(GraphAuthenticator::new(credentials)),
        Err(err) => {
            tracing::warn!("Graph credentials not configured: {}", err);
            None
        }
    };

    let port = config.server_port;
    let state = AppState::new(config, serial, auth);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Server is listening on port {}", port);

    axum::serve(listener, server::router(state))
        .await
        .context("Server failed")?;

    Ok(())
}

fn parse_config_path() -> PathBuf {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return PathBuf::from(path);
            }
        }
    }
    PathBuf::from("config.json")
}

fn setup_logging() {
    let file_appender = tracing_appender::rolling::never(".", "serverlog.txt");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking.and(std::io::stdout))
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("roompanel started");
}
