use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use race_core::{SystemClock, WordList};
use race_server::{config::Config, create_routes, service::GameService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Type Race server...");

    let config = Config::new();

    let words = match &config.words_file {
        Some(path) => {
            info!("Loading words from {}", path.display());
            WordList::from_file(path)?
        }
        None => {
            info!("WORDS_FILE not set, using the built-in word list");
            WordList::builtin()
        }
    };

    let service = Arc::new(GameService::new(
        Arc::new(words),
        Arc::new(SystemClock),
        config.max_word_draws,
    ));
    let routes = create_routes(service);

    let ip = config
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid HOST {}", config.host))?;

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((ip, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let (Ok(mut sigint), Ok(mut sigterm)) = (
                signal::unix::signal(signal::unix::SignalKind::interrupt()),
                signal::unix::signal(signal::unix::SignalKind::terminate()),
            ) else {
                tracing::error!("Failed to install signal handlers");
                return;
            };

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down gracefully...");
            }
        }
    });

    info!("Server started successfully on {}. Press Ctrl+C to stop.", addr);
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}
