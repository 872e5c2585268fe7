use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use uuid::Uuid;

use crate::game::{GameError, GameSnapshot, RoomVariant};
use crate::lobby::{LeaderboardEntry, RoomCode, RoomInfo};

pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

// -- Framing --

pub type Transport = Framed<TcpStream, LengthDelimitedCodec>;

pub fn framed_transport(stream: TcpStream) -> Transport {
    LengthDelimitedCodec::builder()
        .max_frame_length(64 * 1024)
        .new_framed(stream)
}

// -- Client -> Server Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    // Handshake
    Hello {
        player_name: String,
        version: String,
        /// A stable id from a previous session. The server issues a fresh
        /// one when absent.
        identity: Option<Uuid>,
    },

    // Lobby
    CreateRoom {
        variant: RoomVariant,
    },
    JoinRoom {
        code: String,
    },
    /// Attach as a read-only display.
    WatchRoom {
        code: String,
    },
    LeaveRoom,
    ListRooms,
    /// Top players by wins across every room.
    Leaderboard,

    // Round
    StartGame,
    SubmitWord {
        word: String,
        hint: String,
    },
    GuessLetter {
        letter: char,
    },
    StartFullWordGuess,
    SubmitFullWordGuess {
        guess: String,
    },
    CancelFullWordGuess,
    StartNextRound,

    // Connection
    Ping,
    Disconnect,
}

// -- Server -> Client Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    // Handshake
    Welcome {
        player_id: Uuid,
        server_version: String,
    },
    HandshakeError {
        reason: String,
    },

    // Lobby
    RoomList {
        rooms: Vec<RoomInfo>,
    },
    RoomJoined {
        code: RoomCode,
        watching: bool,
        game: GameSnapshot,
    },
    RoomLeft,
    /// Most global wins first, capped at `LEADERBOARD_SIZE` rows.
    Leaderboard {
        entries: Vec<LeaderboardEntry>,
    },

    // Round
    GameState {
        game: GameSnapshot,
    },
    LetterGuessed {
        player_id: Uuid,
        letter: char,
        hit: bool,
    },
    FullWordGuessed {
        player_id: Uuid,
        correct: bool,
    },
    RoundOver {
        winner_id: Option<Uuid>,
        word: String,
    },
    PlayerJoined {
        player_id: Uuid,
        player_name: String,
    },
    PlayerLeft {
        player_id: Uuid,
        player_name: String,
    },

    // Errors
    Error {
        code: ErrorCode,
        message: String,
    },

    // Connection
    Pong,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    RoomNotFound,
    NotInRoom,
    AlreadyInRoom,
    InvalidWord,
    InvalidHint,
    InvalidLetter,
    InvalidName,
    NotYourTurn,
    AlreadyGuessed,
    WrongPhase,
    LockConflict,
    NotLockHolder,
    NotEnoughPlayers,
    UnknownPlayer,
    ReadOnly,
}

impl From<&GameError> for ErrorCode {
    fn from(err: &GameError) -> Self {
        match err {
            GameError::InvalidWord => ErrorCode::InvalidWord,
            GameError::InvalidHint => ErrorCode::InvalidHint,
            GameError::InvalidLetter => ErrorCode::InvalidLetter,
            GameError::InvalidName => ErrorCode::InvalidName,
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::AlreadyGuessed => ErrorCode::AlreadyGuessed,
            GameError::WrongPhase => ErrorCode::WrongPhase,
            GameError::LockConflict => ErrorCode::LockConflict,
            GameError::NotLockHolder => ErrorCode::NotLockHolder,
            GameError::NotEnoughPlayers { .. } => ErrorCode::NotEnoughPlayers,
            GameError::UnknownPlayer => ErrorCode::UnknownPlayer,
            GameError::RoomNotFound => ErrorCode::RoomNotFound,
        }
    }
}

// -- Serialization helpers --

pub fn serialize_message<T: Serialize>(msg: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_vec(msg)?;
    Ok(Bytes::from(json))
}

pub fn deserialize_message<T: for<'de> Deserialize<'de>>(
    data: &[u8],
) -> Result<T, serde_json::Error> {
    serde_json::from_slice(data)
}

// -- Transport helpers --

pub async fn send_message<T: Serialize>(
    transport: &mut Transport,
    msg: &T,
) -> anyhow::Result<()> {
    let bytes = serialize_message(msg).map_err(|e| anyhow::anyhow!("serialize error: {}", e))?;
    transport
        .send(bytes)
        .await
        .map_err(|e| anyhow::anyhow!("send error: {}", e))
}

pub async fn recv_message<T: for<'de> Deserialize<'de>>(
    transport: &mut Transport,
) -> anyhow::Result<Option<T>> {
    match transport.next().await {
        Some(Ok(frame)) => {
            let msg = deserialize_message(&frame)
                .map_err(|e| anyhow::anyhow!("deserialize error: {}", e))?;
            Ok(Some(msg))
        }
        Some(Err(e)) => Err(anyhow::anyhow!("recv error: {}", e)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Command, GameRules, RoomState};

    #[test]
    fn test_hello_carries_optional_identity() {
        let id = Uuid::new_v4();
        let msg = ClientMessage::Hello {
            player_name: "Ana".into(),
            version: PROTOCOL_VERSION.into(),
            identity: Some(id),
        };
        let bytes = serialize_message(&msg).unwrap();
        match deserialize_message::<ClientMessage>(&bytes).unwrap() {
            ClientMessage::Hello {
                player_name,
                identity,
                ..
            } => {
                assert_eq!(player_name, "Ana");
                assert_eq!(identity, Some(id));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_room_joined_carries_snapshot() {
        let host = Uuid::new_v4();
        let room = RoomState::new(GameRules::default())
            .apply(
                host,
                Command::PlayerJoined {
                    name: "Host".into(),
                    global_wins: 0,
                },
            )
            .unwrap();
        let msg = ServerMessage::RoomJoined {
            code: RoomCode::parse("ABCD").unwrap(),
            watching: false,
            game: room.snapshot_for(Some(host)),
        };
        let bytes = serialize_message(&msg).unwrap();
        match deserialize_message::<ServerMessage>(&bytes).unwrap() {
            ServerMessage::RoomJoined { code, game, .. } => {
                assert_eq!(code.as_str(), "ABCD");
                assert_eq!(game.host_id, Some(host));
                assert_eq!(game.players.len(), 1);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_leaderboard_reply_keeps_row_order() {
        let entries: Vec<LeaderboardEntry> = ["Ana", "Bruno"]
            .iter()
            .zip([5, 2])
            .map(|(name, wins)| LeaderboardEntry {
                player_id: Uuid::new_v4(),
                name: name.to_string(),
                wins,
            })
            .collect();
        let msg = ServerMessage::Leaderboard {
            entries: entries.clone(),
        };
        let bytes = serialize_message(&msg).unwrap();
        match deserialize_message::<ServerMessage>(&bytes).unwrap() {
            ServerMessage::Leaderboard { entries: got } => assert_eq!(got, entries),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_game_errors_map_to_codes() {
        assert_eq!(
            ErrorCode::from(&GameError::NotEnoughPlayers { needed: 3 }),
            ErrorCode::NotEnoughPlayers
        );
        assert_eq!(
            ErrorCode::from(&GameError::LockConflict),
            ErrorCode::LockConflict
        );
    }

    #[test]
    fn test_all_client_messages_serialize() {
        let messages = vec![
            ClientMessage::Hello {
                player_name: "Test".into(),
                version: "0.1.0".into(),
                identity: None,
            },
            ClientMessage::CreateRoom {
                variant: RoomVariant::Tv,
            },
            ClientMessage::JoinRoom {
                code: "ABCD".into(),
            },
            ClientMessage::WatchRoom {
                code: "ABCD".into(),
            },
            ClientMessage::LeaveRoom,
            ClientMessage::ListRooms,
            ClientMessage::Leaderboard,
            ClientMessage::StartGame,
            ClientMessage::SubmitWord {
                word: "Maracujá".into(),
                hint: "fruit".into(),
            },
            ClientMessage::GuessLetter { letter: 'é' },
            ClientMessage::StartFullWordGuess,
            ClientMessage::SubmitFullWordGuess {
                guess: "banana".into(),
            },
            ClientMessage::CancelFullWordGuess,
            ClientMessage::StartNextRound,
            ClientMessage::Ping,
            ClientMessage::Disconnect,
        ];

        for msg in &messages {
            let bytes = serialize_message(msg).unwrap();
            let _: ClientMessage = deserialize_message(&bytes).unwrap();
        }
    }
}
