use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use gallows_common::protocol::{
    deserialize_message, framed_transport, serialize_message, ClientMessage, ServerMessage,
};

use crate::event::AppEvent;

/// Connect to the server. Server messages are pushed into `events`; the
/// returned sender carries outgoing messages.
pub async fn connect(
    addr: &str,
    events: mpsc::Sender<AppEvent>,
) -> anyhow::Result<mpsc::Sender<ClientMessage>> {
    let stream = TcpStream::connect(addr).await?;
    let transport = framed_transport(stream);
    let (mut sink, mut stream) = transport.split();

    let (client_tx, mut client_rx) = mpsc::channel::<ClientMessage>(64);

    // Writer task: client_rx -> TCP sink
    tokio::spawn(async move {
        while let Some(msg) = client_rx.recv().await {
            match serialize_message(&msg) {
                Ok(bytes) => {
                    if sink.send(bytes).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize client message: {}", e);
                }
            }
        }
    });

    // Reader task: TCP stream -> app events
    tokio::spawn(async move {
        loop {
            match stream.next().await {
                Some(Ok(frame)) => match deserialize_message::<ServerMessage>(&frame) {
                    Ok(msg) => {
                        if events.send(AppEvent::Network(msg)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse server message: {}", e);
                    }
                },
                Some(Err(e)) => {
                    tracing::warn!("Read error: {}", e);
                    break;
                }
                None => break,
            }
        }
        let _ = events.send(AppEvent::Disconnected).await;
    });

    Ok(client_tx)
}
