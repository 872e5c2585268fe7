use std::io;

use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use uuid::Uuid;

use gallows_common::game::RoomVariant;
use gallows_common::lobby::RoomCode;
use gallows_common::protocol::{ClientMessage, ErrorCode, ServerMessage, PROTOCOL_VERSION};
use gallows_common::words;

use crate::event::{self, AppEvent};
use crate::input::{self, Action};
use crate::network;
use crate::ui::connect::ConnectScreen;
use crate::ui::game::{GameScreen, InputMode};
use crate::ui::help_popup;
use crate::ui::lobby::LobbyScreen;

#[derive(Debug)]
pub enum Screen {
    Connect(ConnectScreen),
    Lobby(LobbyScreen),
    Game(GameScreen),
}

/// What the run loop has to do after an input or server message.
#[derive(Debug)]
pub enum Effect {
    None,
    Send(Vec<ClientMessage>),
    Connect(String),
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub player_id: Option<Uuid>,
    pub player_name: String,
    /// Id presented in the handshake until the server issues one.
    pub identity: Option<Uuid>,
    pub host: String,
    pub tv: bool,
    /// Room to enter as soon as the handshake completes.
    pub pending_room: Option<RoomCode>,
    pub help_open: bool,
    pub running: bool,
}

impl App {
    pub fn new(connect: ConnectScreen, identity: Option<Uuid>) -> Self {
        Self {
            player_id: None,
            player_name: connect.name.clone(),
            identity,
            host: connect.host.clone(),
            tv: connect.tv,
            pending_room: None,
            help_open: false,
            running: true,
            screen: Screen::Connect(connect),
        }
    }

    pub fn hello(&self) -> ClientMessage {
        ClientMessage::Hello {
            player_name: self.player_name.clone(),
            version: PROTOCOL_VERSION.to_string(),
            identity: self.player_id.or(self.identity),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match &self.screen {
            Screen::Connect(s) => s.draw(frame),
            Screen::Lobby(s) => s.draw(frame),
            Screen::Game(s) => s.draw(frame),
        }
        if self.help_open {
            help_popup::draw_help_popup(frame);
        }
    }

    pub fn tick(&mut self) {
        if let Screen::Game(s) = &mut self.screen {
            s.tick();
        }
    }

    /// What the lobby screen asks for whenever it is shown or refreshed.
    fn lobby_requests() -> [ClientMessage; 2] {
        [ClientMessage::ListRooms, ClientMessage::Leaderboard]
    }

    fn to_lobby(&mut self, status: Option<String>) {
        let mut lobby = LobbyScreen::new(self.player_name.clone());
        lobby.player_id = self.player_id;
        lobby.status_message = status;
        self.screen = Screen::Lobby(lobby);
    }

    /// Validates the connect form. Returns the address to dial.
    fn begin_connect(&mut self) -> Effect {
        let Screen::Connect(s) = &mut self.screen else {
            return Effect::None;
        };
        if s.connecting {
            return Effect::None;
        }
        let name = s.name.trim();
        if name.is_empty() {
            s.error_message = Some("Please enter a name".into());
            return Effect::None;
        }
        if !s.room.is_empty() {
            match RoomCode::parse(&s.room) {
                Some(code) => self.pending_room = Some(code),
                None => {
                    s.error_message = Some(format!("'{}' is not a room code", s.room));
                    return Effect::None;
                }
            }
        }
        s.connecting = true;
        s.error_message = None;
        self.player_name = name.to_string();
        self.host = s.host.clone();
        self.tv = s.tv;
        Effect::Connect(self.host.clone())
    }

    pub fn connect_failed(&mut self, err: &anyhow::Error) {
        if let Screen::Connect(s) = &mut self.screen {
            s.connecting = false;
            s.error_message = Some(format!("Connection failed: {}", err));
        }
    }

    pub fn handle_disconnect(&mut self) {
        let mut connect = ConnectScreen::new(
            self.host.clone(),
            self.player_name.clone(),
            String::new(),
            self.tv,
        );
        connect.error_message = Some("Disconnected from server".into());
        self.screen = Screen::Connect(connect);
        self.help_open = false;
    }

    pub fn handle_action(&mut self, action: Action) -> Effect {
        match action {
            Action::Quit => Effect::Quit,
            Action::ShowHelp => {
                self.help_open = true;
                Effect::None
            }
            Action::CloseHelp => {
                self.help_open = false;
                Effect::None
            }

            Action::TypeChar(c) => {
                match &mut self.screen {
                    Screen::Connect(s) => s.type_char(c),
                    Screen::Game(s) => s.type_char(c),
                    Screen::Lobby(_) => {}
                }
                Effect::None
            }
            Action::Backspace => {
                match &mut self.screen {
                    Screen::Connect(s) => s.backspace(),
                    Screen::Game(s) => s.backspace(),
                    Screen::Lobby(_) => {}
                }
                Effect::None
            }
            Action::SwitchField => {
                match &mut self.screen {
                    Screen::Connect(s) => s.switch_field(),
                    Screen::Game(s) => s.switch_field(),
                    Screen::Lobby(_) => {}
                }
                Effect::None
            }
            Action::Submit if matches!(self.screen, Screen::Connect(_)) => self.begin_connect(),
            Action::Submit => match &mut self.screen {
                Screen::Game(s) => match s.input_mode() {
                    InputMode::Setup => match s.setup_submission() {
                        Some((word, hint)) => {
                            Effect::Send(vec![ClientMessage::SubmitWord { word, hint }])
                        }
                        None => Effect::None,
                    },
                    InputMode::FullGuess => match s.guess_submission() {
                        Some(guess) => {
                            Effect::Send(vec![ClientMessage::SubmitFullWordGuess { guess }])
                        }
                        None => Effect::None,
                    },
                    _ => Effect::None,
                },
                Screen::Connect(_) | Screen::Lobby(_) => Effect::None,
            },

            Action::NavigateUp => {
                if let Screen::Lobby(s) = &mut self.screen {
                    s.select_prev();
                }
                Effect::None
            }
            Action::NavigateDown => {
                if let Screen::Lobby(s) = &mut self.screen {
                    s.select_next();
                }
                Effect::None
            }

            Action::RefreshRooms => Effect::Send(Self::lobby_requests().to_vec()),
            Action::CreateRoom => Effect::Send(vec![ClientMessage::CreateRoom {
                variant: RoomVariant::Peer,
            }]),
            Action::CreateTvRoom => Effect::Send(vec![ClientMessage::CreateRoom {
                variant: RoomVariant::Tv,
            }]),
            Action::JoinSelected | Action::WatchSelected => {
                let Screen::Lobby(s) = &self.screen else {
                    return Effect::None;
                };
                match s.selected_room() {
                    Some(code) if action == Action::JoinSelected => {
                        Effect::Send(vec![ClientMessage::JoinRoom {
                            code: code.to_string(),
                        }])
                    }
                    Some(code) => Effect::Send(vec![ClientMessage::WatchRoom {
                        code: code.to_string(),
                    }]),
                    None => Effect::None,
                }
            }
            Action::StartGame => Effect::Send(vec![ClientMessage::StartGame]),
            Action::LeaveRoom => Effect::Send(vec![ClientMessage::LeaveRoom]),

            Action::SuggestWord => {
                if let Screen::Game(s) = &mut self.screen {
                    if let Some(entry) = words::random_entry(&mut rand::thread_rng()) {
                        s.suggest(entry);
                    }
                }
                Effect::None
            }
            Action::GuessLetter(letter) => {
                let Screen::Game(s) = &mut self.screen else {
                    return Effect::None;
                };
                if s.game.is_guessing {
                    s.status_message = Some("Wait until the word guess is over".into());
                    Effect::None
                } else if !s.is_my_turn() {
                    s.status_message = Some("Not your turn".into());
                    Effect::None
                } else {
                    s.status_message = None;
                    Effect::Send(vec![ClientMessage::GuessLetter { letter }])
                }
            }
            Action::OpenFullGuess => Effect::Send(vec![ClientMessage::StartFullWordGuess]),
            Action::CancelFullGuess => Effect::Send(vec![ClientMessage::CancelFullWordGuess]),
            Action::NextRound => Effect::Send(vec![ClientMessage::StartNextRound]),
        }
    }

    pub fn handle_server_message(&mut self, msg: ServerMessage) -> Vec<ClientMessage> {
        let mut outbound = Vec::new();

        match msg {
            ServerMessage::Welcome {
                player_id,
                server_version,
            } => {
                tracing::info!(%player_id, %server_version, "Connected");
                self.player_id = Some(player_id);
                self.to_lobby(None);
                outbound.extend(Self::lobby_requests());
                match (self.pending_room.take(), self.tv) {
                    (Some(code), true) => outbound.push(ClientMessage::WatchRoom {
                        code: code.to_string(),
                    }),
                    (Some(code), false) => outbound.push(ClientMessage::JoinRoom {
                        code: code.to_string(),
                    }),
                    (None, true) => outbound.push(ClientMessage::CreateRoom {
                        variant: RoomVariant::Tv,
                    }),
                    (None, false) => {}
                }
            }

            ServerMessage::HandshakeError { reason } => {
                if let Screen::Connect(s) = &mut self.screen {
                    s.connecting = false;
                    s.error_message = Some(reason);
                }
            }

            ServerMessage::RoomList { rooms } => {
                if let Screen::Lobby(s) = &mut self.screen {
                    s.set_rooms(rooms);
                }
            }

            ServerMessage::Leaderboard { entries } => {
                if let Screen::Lobby(s) = &mut self.screen {
                    s.leaderboard = entries;
                }
            }

            ServerMessage::RoomJoined {
                code,
                watching,
                game,
            } => {
                if let Some(pid) = self.player_id {
                    let mut screen = GameScreen::new(pid, code.clone(), watching, game);
                    screen.push_log(if watching {
                        format!("Showing room {}", code)
                    } else {
                        format!("Joined room {}", code)
                    });
                    self.screen = Screen::Game(screen);
                }
            }

            ServerMessage::RoomLeft => {
                self.to_lobby(None);
                outbound.extend(Self::lobby_requests());
            }

            ServerMessage::GameState { game } => {
                if let Screen::Game(s) = &mut self.screen {
                    s.update(game);
                }
            }

            ServerMessage::LetterGuessed {
                player_id,
                letter,
                hit,
            } => {
                if let Screen::Game(s) = &mut self.screen {
                    let name = s.game.player_name(Some(player_id)).unwrap_or("?").to_string();
                    let verdict = if hit { "hit" } else { "miss" };
                    s.push_log(format!("{} guessed {}: {}", name, letter, verdict));
                    s.flash_letter(hit);
                }
            }

            ServerMessage::FullWordGuessed { player_id, correct } => {
                if let Screen::Game(s) = &mut self.screen {
                    let name = s.game.player_name(Some(player_id)).unwrap_or("?").to_string();
                    s.push_log(if correct {
                        format!("{} guessed the word!", name)
                    } else {
                        format!("{} guessed wrong and lost a win", name)
                    });
                }
            }

            ServerMessage::RoundOver { winner_id, word } => {
                if let Screen::Game(s) = &mut self.screen {
                    let line = match s.game.player_name(winner_id) {
                        Some(name) => format!("{} wins the round ({})", name, word),
                        None => format!("Hanged! The word was {}", word),
                    };
                    s.push_log(line);
                }
            }

            ServerMessage::PlayerJoined { player_name, .. } => {
                if let Screen::Game(s) = &mut self.screen {
                    s.push_log(format!("{} joined", player_name));
                }
            }

            ServerMessage::PlayerLeft { player_name, .. } => {
                if let Screen::Game(s) = &mut self.screen {
                    s.push_log(format!("{} left", player_name));
                }
            }

            ServerMessage::Error { code, message } => {
                tracing::debug!(?code, %message, "Server rejected request");
                if code == ErrorCode::RoomNotFound {
                    self.to_lobby(Some(format!("Error: {}", message)));
                    outbound.extend(Self::lobby_requests());
                } else {
                    match &mut self.screen {
                        Screen::Connect(s) => s.error_message = Some(message),
                        Screen::Lobby(s) => s.status_message = Some(format!("Error: {}", message)),
                        Screen::Game(s) => s.status_message = Some(format!("Error: {}", message)),
                    }
                }
            }

            ServerMessage::Pong => {}
        }

        outbound
    }
}

pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    autoconnect: bool,
) -> anyhow::Result<()> {
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(64);
    tokio::spawn(event::event_loop(event_tx.clone()));

    let mut network_tx: Option<mpsc::Sender<ClientMessage>> = None;
    let mut pending = if autoconnect {
        app.handle_action(Action::Submit)
    } else {
        Effect::None
    };

    while app.running {
        match std::mem::replace(&mut pending, Effect::None) {
            Effect::None => {}
            Effect::Send(messages) => {
                if let Some(ref tx) = network_tx {
                    for msg in messages {
                        if tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Effect::Connect(addr) => {
                terminal.draw(|frame| app.draw(frame))?;
                match network::connect(&addr, event_tx.clone()).await {
                    Ok(tx) => {
                        let _ = tx.send(app.hello()).await;
                        network_tx = Some(tx);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to connect to {}: {}", addr, e);
                        app.connect_failed(&e);
                    }
                }
            }
            Effect::Quit => {
                if let Some(ref tx) = network_tx {
                    let _ = tx.send(ClientMessage::Disconnect).await;
                }
                app.running = false;
                continue;
            }
        }

        terminal.draw(|frame| app.draw(frame))?;

        let event = match event_rx.recv().await {
            Some(e) => e,
            None => break,
        };

        pending = match event {
            AppEvent::Key(key) => match input::map_key(key, &app.screen, app.help_open) {
                Some(action) => app.handle_action(action),
                None => Effect::None,
            },
            AppEvent::Network(msg) => Effect::Send(app.handle_server_message(msg)),
            AppEvent::Disconnected => {
                tracing::info!("Connection closed");
                network_tx = None;
                app.handle_disconnect();
                Effect::None
            }
            AppEvent::Tick => {
                app.tick();
                Effect::None
            }
        };
    }

    Ok(())
}
