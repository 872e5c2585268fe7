mod connection;
mod handler;
mod leaderboard;
mod lobby;
mod room;
mod server;

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};
use gallows_common::game::{HostRotation, TurnOnHit};

use crate::server::ServerConfig;

/// Gallows Server - Multiplayer hangman party game server
#[derive(Parser, Debug)]
#[command(name = "gallows-server", version, about)]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:9876")]
    bind: String,

    /// Maximum simultaneous connections allowed
    #[arg(short, long, default_value_t = 100)]
    max_connections: usize,

    /// Players needed to start a game (defaults to 3 for TV rooms, 2 for peer rooms)
    #[arg(long)]
    min_players: Option<usize>,

    /// What happens to the turn after a correct letter
    #[arg(long, value_enum, default_value_t = TurnOnHitArg::Keep)]
    turn_on_hit: TurnOnHitArg,

    /// How the next round host is picked
    #[arg(long, value_enum, default_value_t = HostRotationArg::Fair)]
    host_rotation: HostRotationArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TurnOnHitArg {
    Keep,
    Pass,
}

impl From<TurnOnHitArg> for TurnOnHit {
    fn from(arg: TurnOnHitArg) -> Self {
        match arg {
            TurnOnHitArg::Keep => TurnOnHit::Keep,
            TurnOnHitArg::Pass => TurnOnHit::Pass,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HostRotationArg {
    Fair,
    Winner,
}

impl From<HostRotationArg> for HostRotation {
    fn from(arg: HostRotationArg) -> Self {
        match arg {
            HostRotationArg::Fair => HostRotation::Fair,
            HostRotationArg::Winner => HostRotation::WinnerHosts,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallows_server=debug,gallows_common=debug".into()),
        )
        .init();

    let args = Args::parse();

    let addr: SocketAddr = args.bind.parse()?;
    if args.min_players == Some(0) {
        anyhow::bail!("--min-players must be at least 1");
    }

    let config = ServerConfig {
        max_connections: args.max_connections,
        min_players: args.min_players,
        turn_on_hit: args.turn_on_hit.into(),
        host_rotation: args.host_rotation.into(),
    };

    tracing::info!(
        "Starting gallows server on {} (max {} connections, {:?}, {:?})",
        addr,
        config.max_connections,
        config.turn_on_hit,
        config.host_rotation
    );
    server::run(addr, config).await
}
