use chrono::{DateTime, Utc};
use uuid::Uuid;

use gallows_common::game::{Command, GameError, GameRules, GameSnapshot, Phase, RoomState, RoomVariant};
use gallows_common::lobby::{RoomCode, RoomInfo};
use gallows_common::protocol::ServerMessage;

pub struct Room {
    pub code: RoomCode,
    pub variant: RoomVariant,
    pub created_at: DateTime<Utc>,
    pub game: RoomState,
    /// Read-only displays (the TV), in attach order.
    pub displays: Vec<Uuid>,
}

impl Room {
    pub fn new(code: RoomCode, variant: RoomVariant, rules: GameRules) -> Self {
        Self {
            code,
            variant,
            created_at: Utc::now(),
            game: RoomState::new(rules),
            displays: Vec::new(),
        }
    }

    /// Runs `command` through the state machine. On success the new state
    /// replaces the old one and the events describing the change are
    /// returned; on rejection nothing changes.
    pub fn apply(&mut self, actor: Uuid, command: Command) -> Result<Vec<ServerMessage>, GameError> {
        let next = self.game.apply(actor, command.clone())?;
        let events = round_events(&self.game, &next, actor, &command);
        self.game = next;
        Ok(events)
    }

    pub fn add_display(&mut self, display_id: Uuid) {
        if !self.displays.contains(&display_id) {
            self.displays.push(display_id);
        }
    }

    pub fn remove_display(&mut self, display_id: Uuid) -> bool {
        let before = self.displays.len();
        self.displays.retain(|id| *id != display_id);
        self.displays.len() != before
    }

    pub fn is_display(&self, id: Uuid) -> bool {
        self.displays.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.game.players.is_empty() && self.displays.is_empty()
    }

    /// Get all player + display IDs for broadcasting.
    pub fn member_ids(&self) -> Vec<Uuid> {
        self.game
            .players
            .iter()
            .map(|p| p.id)
            .chain(self.displays.iter().copied())
            .collect()
    }

    /// What `member` is allowed to see. Displays never see the word before
    /// the round ends.
    pub fn snapshot_for(&self, member: Uuid) -> GameSnapshot {
        if self.is_display(member) {
            self.game.snapshot_for(None)
        } else {
            self.game.snapshot_for(Some(member))
        }
    }

    /// Every member gets `events` followed by their own view of the state.
    pub fn fan_out(&self, events: &[ServerMessage]) -> Vec<(Uuid, ServerMessage)> {
        let mut outbound = Vec::new();
        for id in self.member_ids() {
            outbound.extend(events.iter().cloned().map(|e| (id, e)));
            outbound.push((
                id,
                ServerMessage::GameState {
                    game: self.snapshot_for(id),
                },
            ));
        }
        outbound
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            variant: self.variant,
            player_count: self.game.players.len(),
            display_count: self.displays.len(),
            phase: self.game.phase.clone(),
            round: self.game.round,
            created_at: self.created_at,
        }
    }
}

/// The notifications a transition from `prev` to `next` produces, besides
/// the new snapshot itself.
fn round_events(prev: &RoomState, next: &RoomState, actor: Uuid, command: &Command) -> Vec<ServerMessage> {
    let mut events = Vec::new();

    match command {
        Command::PlayerJoined { .. } if !prev.is_member(actor) => {
            if let Some(p) = next.player(actor) {
                events.push(ServerMessage::PlayerJoined {
                    player_id: p.id,
                    player_name: p.name.clone(),
                });
            }
        }
        Command::PlayerLeft { player_id } => {
            if let Some(p) = prev.player(*player_id) {
                events.push(ServerMessage::PlayerLeft {
                    player_id: p.id,
                    player_name: p.name.clone(),
                });
            }
        }
        Command::GuessLetter { .. } => {
            if let Some(&letter) = next.used_letters.last() {
                events.push(ServerMessage::LetterGuessed {
                    player_id: actor,
                    letter,
                    hit: next.mistakes == prev.mistakes,
                });
            }
        }
        Command::SubmitFullWordGuess { .. } => {
            events.push(ServerMessage::FullWordGuessed {
                player_id: actor,
                correct: next.winner_id == Some(actor) && next.phase == Phase::Finished,
            });
        }
        _ => {}
    }

    if prev.phase != Phase::Finished && next.phase == Phase::Finished {
        events.push(ServerMessage::RoundOver {
            winner_id: next.winner_id,
            word: next.word.clone(),
        });
    }

    events
}
