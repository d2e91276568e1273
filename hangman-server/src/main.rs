use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use hangman_core::{GameRules, WordList};
use hangman_persistence::connection::connect_and_migrate;
use hangman_persistence::repositories::ScoreRepository;
use hangman_persistence::ScoreStore;
use hangman_server::registry::GameRegistry;
use hangman_server::websocket::ConnectionManager;
use hangman_server::{config::Config, create_routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    info!("Starting Hangman server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());

    let words = match &config.word_list_path {
        Some(path) => match WordList::from_file(path) {
            Ok(list) => {
                info!("Loaded {} words from {}", list.len(), path);
                Arc::new(list)
            }
            Err(e) => {
                tracing::error!("Failed to load word list from '{}': {:#}", path, e);
                tracing::error!("Set WORD_LIST_PATH to a file with one word per line, or unset it to use the built-in list.");
                std::process::exit(1);
            }
        },
        None => {
            let list = WordList::builtin();
            info!("Using built-in word list ({} words)", list.len());
            Arc::new(list)
        }
    };

    let rules = GameRules {
        unique_names: config.enforce_unique_names,
    };
    let registry = Arc::new(GameRegistry::new(words, rules));

    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };
    let scores: Arc<dyn ScoreStore> = Arc::new(ScoreRepository::new(db));

    let routes = create_routes(connection_manager.clone(), registry.clone(), scores);

    // Periodic sweep of dead connections and abandoned games
    let cleanup_connection_manager = connection_manager.clone();
    let cleanup_registry = registry.clone();
    let cleanup_config = config.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let connection_timeout =
                Duration::from_secs(cleanup_config.connection_timeout_seconds);
            let game_timeout = Duration::from_secs(cleanup_config.game_timeout_minutes * 60);

            cleanup_connection_manager
                .cleanup_inactive_connections(connection_timeout)
                .await;
            cleanup_registry.cleanup_abandoned_games(game_timeout).await;
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config
            .host
            .parse::<std::net::IpAddr>()
            .expect("Invalid HOST"),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        #[cfg(unix)]
        {
            let mut sigint =
                signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm =
                signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

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

    info!("Server started successfully on {}. Press Ctrl+C to stop.", addr);
    server.await;
    info!("Server shutdown complete.");
}
