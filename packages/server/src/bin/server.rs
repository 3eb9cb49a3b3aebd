//! Hibiki real-time room chat relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hibiki-server
//! cargo run --bin hibiki-server -- --host 0.0.0.0 --port 3000 --database hibiki.db --moderator 127.0.0.1
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use hibiki_server::{
    config::ServerConfig,
    domain::{MessageStore, StoreError},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        privilege::AllowListPrivilegeOracle,
        repository::{Database, InMemoryMessageStore, InMemoryPresenceRegistry, SqliteMessageStore},
    },
    ui::{AppState, Server},
};
use hibiki_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use tokio::sync::Mutex;

fn open_store(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn MessageStore>, StoreError> {
    match &config.database {
        Some(path) => {
            let db = Arc::new(Database::open(path)?);
            tracing::info!("Messages are stored in SQLite database {}", path.display());
            Ok(Arc::new(SqliteMessageStore::new(db, clock)))
        }
        None => {
            tracing::info!("Messages are kept in memory (use --database to persist them)");
            Ok(Arc::new(InMemoryMessageStore::new(clock)))
        }
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. MessageStore / PresenceRegistry
    // 2. MessagePusher
    // 3. PrivilegeOracle
    // 4. UseCases (AppState)
    // 5. Server

    // 1. Create MessageStore and PresenceRegistry
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = match open_store(&config, clock.clone()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open message store: {}", e);
            std::process::exit(1);
        }
    };
    let presence = Arc::new(InMemoryPresenceRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));

    // 3. Create PrivilegeOracle
    if config.moderators.is_empty() {
        tracing::warn!("No --moderator given; room clears and moderated deletes are disabled");
    }
    let privilege_oracle = Arc::new(AllowListPrivilegeOracle::new(
        config.moderators.iter().copied(),
    ));

    // 4. Create UseCases
    let state = AppState::build(
        store,
        presence,
        message_pusher,
        privilege_oracle,
        clock,
        config.history_limit(),
    );

    // 5. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
