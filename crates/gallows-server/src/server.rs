use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::RwLock;
use uuid::Uuid;

use gallows_common::game::{GameRules, HostRotation, RoomVariant, TurnOnHit};

use crate::connection::{self, ConnectionHandle};
use crate::leaderboard::WinLedger;
use crate::lobby::LobbyManager;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_connections: usize,
    /// Overrides the per-variant minimum when set.
    pub min_players: Option<usize>,
    pub turn_on_hit: TurnOnHit,
    pub host_rotation: HostRotation,
}

impl ServerConfig {
    pub fn rules_for(&self, variant: RoomVariant) -> GameRules {
        let defaults = GameRules::for_variant(variant);
        GameRules {
            min_players: self.min_players.unwrap_or(defaults.min_players),
            turn_on_hit: self.turn_on_hit,
            host_rotation: self.host_rotation,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            min_players: None,
            turn_on_hit: TurnOnHit::default(),
            host_rotation: HostRotation::default(),
        }
    }
}

pub struct ServerState {
    pub lobby: RwLock<LobbyManager>,
    pub connections: RwLock<HashMap<Uuid, ConnectionHandle>>,
    pub global_wins: RwLock<WinLedger>,
    pub config: ServerConfig,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            lobby: RwLock::new(LobbyManager::new()),
            connections: RwLock::new(HashMap::new()),
            global_wins: RwLock::new(WinLedger::new()),
            config,
        }
    }
}

pub async fn run(addr: SocketAddr, config: ServerConfig) -> anyhow::Result<()> {
    let state: SharedState = Arc::new(ServerState::new(config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        // Enforce max connections
        let conn_count = state.connections.read().await.len();
        if conn_count >= state.config.max_connections {
            tracing::warn!(
                "Rejecting connection from {} (max {} reached)",
                peer_addr,
                state.config.max_connections
            );
            drop(stream);
            continue;
        }

        tracing::info!(
            "New connection from {} ({}/{})",
            peer_addr,
            conn_count + 1,
            state.config.max_connections
        );

        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = connection::handle_connection(stream, state).await {
                tracing::warn!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}
