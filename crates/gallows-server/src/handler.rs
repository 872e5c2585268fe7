use rand::SeedableRng;
use uuid::Uuid;

use gallows_common::game::{Command, GameError, RoomVariant};
use gallows_common::lobby::{RoomCode, LEADERBOARD_SIZE};
use gallows_common::protocol::{ClientMessage, ErrorCode, ServerMessage};

use crate::room::Room;
use crate::server::SharedState;

pub async fn handle_message(
    player_id: Uuid,
    msg: ClientMessage,
    state: &SharedState,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::ListRooms => {
            let rooms = state.lobby.read().await.list_rooms();
            send_to_player(player_id, ServerMessage::RoomList { rooms }, state).await;
        }

        ClientMessage::Leaderboard => {
            let entries = state.global_wins.read().await.top(LEADERBOARD_SIZE);
            send_to_player(player_id, ServerMessage::Leaderboard { entries }, state).await;
        }

        ClientMessage::CreateRoom { variant } => {
            if current_room(player_id, state).await.is_some() {
                send_error(player_id, ErrorCode::AlreadyInRoom, "Leave your room first", state).await;
                return Ok(());
            }

            let rules = state.config.rules_for(variant);
            let mut rng = rand::rngs::StdRng::from_entropy();
            let code = state
                .lobby
                .write()
                .await
                .create_room(variant, rules, &mut rng);
            tracing::info!("Room {} created ({:?}) by {}", code, variant, player_id);

            match variant {
                RoomVariant::Tv => attach_display(player_id, code, state).await,
                RoomVariant::Peer => join_as_player(player_id, code, state).await,
            }
        }

        ClientMessage::JoinRoom { code } => {
            if current_room(player_id, state).await.is_some() {
                send_error(player_id, ErrorCode::AlreadyInRoom, "Leave your room first", state).await;
                return Ok(());
            }
            match lookup_room(&code, state).await {
                Some(code) => join_as_player(player_id, code, state).await,
                None => send_room_not_found(player_id, state).await,
            }
        }

        ClientMessage::WatchRoom { code } => {
            if current_room(player_id, state).await.is_some() {
                send_error(player_id, ErrorCode::AlreadyInRoom, "Leave your room first", state).await;
                return Ok(());
            }
            match lookup_room(&code, state).await {
                Some(code) => attach_display(player_id, code, state).await,
                None => send_room_not_found(player_id, state).await,
            }
        }

        ClientMessage::LeaveRoom => {
            handle_leave_room(player_id, state).await;
        }

        ClientMessage::StartGame => play(player_id, Command::StartGame, state).await,
        ClientMessage::SubmitWord { word, hint } => {
            play(player_id, Command::SubmitWord { word, hint }, state).await
        }
        ClientMessage::GuessLetter { letter } => {
            play(player_id, Command::GuessLetter { letter }, state).await
        }
        ClientMessage::StartFullWordGuess => {
            play(player_id, Command::StartFullWordGuess, state).await
        }
        ClientMessage::SubmitFullWordGuess { guess } => {
            play(player_id, Command::SubmitFullWordGuess { guess }, state).await
        }
        ClientMessage::CancelFullWordGuess => {
            play(player_id, Command::CancelFullWordGuess, state).await
        }
        ClientMessage::StartNextRound => play(player_id, Command::StartNextRound, state).await,

        ClientMessage::Ping => {
            send_to_player(player_id, ServerMessage::Pong, state).await;
        }

        ClientMessage::Disconnect => {
            handle_disconnect(player_id, state).await;
        }

        ClientMessage::Hello { .. } => {
            tracing::debug!("Ignoring repeated Hello from {}", player_id);
        }
    }

    Ok(())
}

/// Applies a round command from a player in a room and pushes the outcome to
/// every member. Rejections only go back to the sender.
async fn play(player_id: Uuid, command: Command, state: &SharedState) {
    let (code, is_display) = {
        let conns = state.connections.read().await;
        match conns.get(&player_id) {
            Some(c) => (c.room.clone(), c.is_display),
            None => return,
        }
    };

    let code = match code {
        Some(code) => code,
        None => {
            send_error(player_id, ErrorCode::NotInRoom, "You are not in a room", state).await;
            return;
        }
    };
    if is_display {
        send_error(player_id, ErrorCode::ReadOnly, "Displays cannot play", state).await;
        return;
    }

    let mut lobby = state.lobby.write().await;
    let room = match lobby.get_room_mut(&code) {
        Some(r) => r,
        None => {
            drop(lobby);
            send_room_not_found(player_id, state).await;
            return;
        }
    };

    let label = format!("{:?}", command);
    match room.apply(player_id, command) {
        Ok(events) => {
            tracing::debug!(
                "Room {} v{}: {} applied {}",
                code,
                room.game.version,
                player_id,
                label
            );
            record_global_wins(room, state).await;
            let outbound = room.fan_out(&events);
            drop(lobby);
            deliver(outbound, state).await;
        }
        Err(e) => {
            drop(lobby);
            tracing::debug!("Room {}: rejected {} from {}: {}", code, label, player_id, e);
            let (code, message) = game_error_to_protocol(&e);
            send_to_player(player_id, ServerMessage::Error { code, message }, state).await;
        }
    }
}

async fn join_as_player(player_id: Uuid, code: RoomCode, state: &SharedState) {
    let player_name = match state.connections.read().await.get(&player_id) {
        Some(c) => c.player_name.clone(),
        None => return,
    };
    let global_wins = state.global_wins.read().await.wins(player_id);

    let mut lobby = state.lobby.write().await;
    let room = match lobby.get_room_mut(&code) {
        Some(r) => r,
        None => {
            drop(lobby);
            send_room_not_found(player_id, state).await;
            return;
        }
    };

    let events = match room.apply(
        player_id,
        Command::PlayerJoined {
            name: player_name.clone(),
            global_wins,
        },
    ) {
        Ok(events) => events,
        Err(e) => {
            drop(lobby);
            let (code, message) = game_error_to_protocol(&e);
            send_to_player(player_id, ServerMessage::Error { code, message }, state).await;
            return;
        }
    };

    tracing::info!("Player '{}' joined room {}", player_name, code);
    let joined = ServerMessage::RoomJoined {
        code: code.clone(),
        watching: false,
        game: room.snapshot_for(player_id),
    };
    let outbound: Vec<_> = room
        .fan_out(&events)
        .into_iter()
        .filter(|(id, _)| *id != player_id)
        .collect();
    drop(lobby);

    set_connection_room(player_id, Some(code), false, state).await;
    send_to_player(player_id, joined, state).await;
    deliver(outbound, state).await;
}

async fn attach_display(display_id: Uuid, code: RoomCode, state: &SharedState) {
    let mut lobby = state.lobby.write().await;
    let room = match lobby.get_room_mut(&code) {
        Some(r) => r,
        None => {
            drop(lobby);
            send_room_not_found(display_id, state).await;
            return;
        }
    };
    room.add_display(display_id);
    let joined = ServerMessage::RoomJoined {
        code: code.clone(),
        watching: true,
        game: room.snapshot_for(display_id),
    };
    drop(lobby);

    tracing::info!("Display {} attached to room {}", display_id, code);
    set_connection_room(display_id, Some(code), true, state).await;
    send_to_player(display_id, joined, state).await;
}

async fn handle_leave_room(player_id: Uuid, state: &SharedState) {
    let code = match current_room(player_id, state).await {
        Some(code) => code,
        None => return,
    };

    let mut lobby = state.lobby.write().await;
    let mut outbound = Vec::new();
    let mut now_empty = false;

    if let Some(room) = lobby.get_room_mut(&code) {
        if room.remove_display(player_id) {
            tracing::info!("Display {} detached from room {}", player_id, code);
        } else {
            match room.apply(player_id, Command::PlayerLeft { player_id }) {
                Ok(events) => {
                    tracing::info!("Player {} left room {}", player_id, code);
                    record_global_wins(room, state).await;
                    outbound = room.fan_out(&events);
                }
                Err(e) => {
                    tracing::warn!("Player {} leaving room {}: {}", player_id, code, e);
                }
            }
        }
        now_empty = room.is_empty();
    }

    if now_empty {
        lobby.remove_room(&code);
    }
    drop(lobby);

    set_connection_room(player_id, None, false, state).await;
    deliver(outbound, state).await;
    send_to_player(player_id, ServerMessage::RoomLeft, state).await;
}

pub async fn handle_disconnect(player_id: Uuid, state: &SharedState) {
    // Leave room first, which also releases any word-guess lock
    handle_leave_room(player_id, state).await;

    // Remove connection
    state.connections.write().await.remove(&player_id);

    // Prune empty rooms
    state.lobby.write().await.prune_empty_rooms();
}

/// Copies every roster member's name and global win count back into the
/// server-wide ledger after a transition.
async fn record_global_wins(room: &Room, state: &SharedState) {
    let mut ledger = state.global_wins.write().await;
    for p in &room.game.players {
        ledger.record(p.id, &p.name, p.global_wins);
    }
}

async fn current_room(player_id: Uuid, state: &SharedState) -> Option<RoomCode> {
    state
        .connections
        .read()
        .await
        .get(&player_id)
        .and_then(|c| c.room.clone())
}

/// Resolves a user-typed code to a live room.
async fn lookup_room(input: &str, state: &SharedState) -> Option<RoomCode> {
    let code = RoomCode::parse(input)?;
    let lobby = state.lobby.read().await;
    lobby.get_room(&code).map(|r| r.code.clone())
}

async fn set_connection_room(
    player_id: Uuid,
    room: Option<RoomCode>,
    is_display: bool,
    state: &SharedState,
) {
    let mut conns = state.connections.write().await;
    if let Some(conn) = conns.get_mut(&player_id) {
        conn.room = room;
        conn.is_display = is_display;
    }
}

async fn send_to_player(player_id: Uuid, msg: ServerMessage, state: &SharedState) {
    let conns = state.connections.read().await;
    if let Some(conn) = conns.get(&player_id) {
        let _ = conn.tx.send(msg).await;
    }
}

async fn send_error(player_id: Uuid, code: ErrorCode, message: &str, state: &SharedState) {
    send_to_player(
        player_id,
        ServerMessage::Error {
            code,
            message: message.into(),
        },
        state,
    )
    .await;
}

async fn send_room_not_found(player_id: Uuid, state: &SharedState) {
    let (code, message) = game_error_to_protocol(&GameError::RoomNotFound);
    send_to_player(player_id, ServerMessage::Error { code, message }, state).await;
}

/// Deliver per-recipient messages in order.
async fn deliver(outbound: Vec<(Uuid, ServerMessage)>, state: &SharedState) {
    let conns = state.connections.read().await;
    for (id, msg) in outbound {
        if let Some(conn) = conns.get(&id) {
            let _ = conn.tx.send(msg).await;
        }
    }
}

fn game_error_to_protocol(e: &GameError) -> (ErrorCode, String) {
    (ErrorCode::from(e), e.to_string())
}
