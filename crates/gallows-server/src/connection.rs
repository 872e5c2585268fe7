use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use uuid::Uuid;

use gallows_common::lobby::RoomCode;
use gallows_common::protocol::{
    self, framed_transport, serialize_message, ClientMessage, ServerMessage, PROTOCOL_VERSION,
};

use crate::handler;
use crate::server::SharedState;

pub struct ConnectionHandle {
    pub player_id: Uuid,
    pub player_name: String,
    pub tx: mpsc::Sender<ServerMessage>,
    pub room: Option<RoomCode>,
    /// Attached to `room` as a read-only display rather than a player.
    pub is_display: bool,
}

impl ConnectionHandle {
    pub fn new(player_id: Uuid, player_name: String, tx: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            player_id,
            player_name,
            tx,
            room: None,
            is_display: false,
        }
    }
}

pub async fn handle_connection(stream: TcpStream, state: SharedState) -> anyhow::Result<()> {
    let mut transport = framed_transport(stream);

    // Step 1: Handshake -- expect Hello
    let hello: ClientMessage = match protocol::recv_message(&mut transport).await? {
        Some(msg) => msg,
        None => return Ok(()),
    };

    let (player_id, player_name, identity) = match hello {
        ClientMessage::Hello {
            player_name,
            version,
            identity,
        } => {
            tracing::info!(
                "Player '{}' connected (client version: {})",
                player_name,
                version
            );
            let name = player_name.trim().to_string();
            if name.is_empty() {
                protocol::send_message(
                    &mut transport,
                    &ServerMessage::HandshakeError {
                        reason: "Name must not be empty".into(),
                    },
                )
                .await?;
                return Ok(());
            }
            (identity.unwrap_or_else(Uuid::new_v4), name, identity)
        }
        _ => {
            protocol::send_message(
                &mut transport,
                &ServerMessage::HandshakeError {
                    reason: "Expected Hello message".into(),
                },
            )
            .await?;
            return Ok(());
        }
    };

    // Step 2: Create mpsc channel for outbound messages
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(64);

    // Register connection. A presented identity may only be online once.
    {
        let mut conns = state.connections.write().await;
        if conns.contains_key(&player_id) {
            drop(conns);
            tracing::warn!("Identity {} is already connected", player_id);
            protocol::send_message(
                &mut transport,
                &ServerMessage::HandshakeError {
                    reason: "This identity is already connected".into(),
                },
            )
            .await?;
            return Ok(());
        }
        conns.insert(
            player_id,
            ConnectionHandle::new(player_id, player_name.clone(), tx.clone()),
        );
    }

    if identity.is_some() {
        tracing::debug!("Player '{}' resumed identity {}", player_name, player_id);
    }

    protocol::send_message(
        &mut transport,
        &ServerMessage::Welcome {
            player_id,
            server_version: PROTOCOL_VERSION.to_string(),
        },
    )
    .await?;

    // Step 3: Split transport for independent read/write
    let (mut sink, mut stream) = transport.split();

    // Writer task: drains rx and writes to sink
    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serialize_message(&msg) {
                Ok(bytes) => {
                    if sink.send(bytes).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Step 4: Reader loop
    loop {
        match stream.next().await {
            Some(Ok(frame)) => match protocol::deserialize_message::<ClientMessage>(&frame) {
                Ok(ClientMessage::Disconnect) => {
                    tracing::info!("Player '{}' said goodbye", player_name);
                    break;
                }
                Ok(msg) => {
                    if let Err(e) = handler::handle_message(player_id, msg, &state).await {
                        tracing::error!("Handler error for {}: {}", player_name, e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse message from {}: {}", player_name, e);
                }
            },
            Some(Err(e)) => {
                tracing::warn!("Read error from {}: {}", player_name, e);
                break;
            }
            None => {
                tracing::info!("Player '{}' disconnected", player_name);
                break;
            }
        }
    }

    // Cleanup
    handler::handle_disconnect(player_id, &state).await;
    write_task.abort();
    Ok(())
}
