use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use relay_core::{DictionaryIndex, FixedStartWord, GameRound, IdentityService, ScoreLedger};
use relay_server::registry::ConnectionRegistry;
use relay_server::service::GameService;
use relay_server::{config::Config, create_routes};
use relay_store::{MemoryStore, SharedStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting word relay server...");

    let config = Config::new();

    info!("Loading words from directory: {}", config.words_directory);
    let dictionary = match DictionaryIndex::from_directory(&config.words_directory) {
        Ok(dictionary) => {
            info!(words = dictionary.word_count(), "dictionary loaded");
            Arc::new(dictionary)
        }
        Err(e) => {
            tracing::error!(
                "Failed to load words from directory '{}': {}",
                config.words_directory,
                e
            );
            tracing::error!("The server requires partition word files to function.");
            tracing::error!(
                "Set WORDS_DIRECTORY to a directory containing dict_*.txt word files."
            );
            std::process::exit(1);
        }
    };

    let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
    let ledger = ScoreLedger::new(store.clone());
    let identity = IdentityService::new(store.clone(), ledger.clone());
    let round = GameRound::new(
        store,
        dictionary,
        ledger.clone(),
        Arc::new(FixedStartWord(config.start_word.clone())),
        config.round_policy(),
    );

    let registry = Arc::new(ConnectionRegistry::new());
    let service = Arc::new(GameService::new(round, ledger, identity, registry.clone()));

    let routes = create_routes(service);

    // Periodic heartbeat so idle clients keep their connection alive and
    // dead ones get evicted.
    let heartbeat_registry = registry.clone();
    let heartbeat_interval = Duration::from_secs(config.heartbeat_interval_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(heartbeat_interval);
        loop {
            interval.tick().await;
            heartbeat_registry.heartbeat_sweep().await;
        }
    });

    // Periodic eviction of connections with no recent activity.
    let stale_registry = registry.clone();
    let stale_interval = Duration::from_secs(config.stale_sweep_interval_seconds);
    let stale_threshold = config.stale_threshold();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(stale_interval);
        loop {
            interval.tick().await;
            stale_registry.stale_sweep(stale_threshold).await;
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => (ip, config.port),
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("Failed to install SIGINT handler");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler");

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
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
