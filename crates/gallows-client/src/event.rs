use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;

use gallows_common::protocol::ServerMessage;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Network(ServerMessage),
    Disconnected,
    Tick,
}

/// Feeds terminal keys and ticks into the app. Network events are pushed
/// into the same channel by the connection's reader task.
pub async fn event_loop(event_tx: mpsc::Sender<AppEvent>) {
    let mut key_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    loop {
        let event = tokio::select! {
            Some(Ok(Event::Key(key))) = key_stream.next() => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                AppEvent::Key(key)
            }
            _ = tick_interval.tick() => {
                AppEvent::Tick
            }
        };

        if event_tx.send(event).await.is_err() {
            break;
        }
    }
}
