use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::{self, normalize_letter, normalize_word};
use crate::player::Player;
use crate::turn;

/// Wrong letters allowed before the round is lost (head, body, two arms,
/// two legs).
pub const MAX_MISTAKES: u8 = 6;

/// Mask cell for a letter that has not been revealed yet.
pub const BLANK: char = '_';

// -- Rules --

/// What happens to the turn after a correct letter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TurnOnHit {
    /// The guesser keeps going until they miss.
    #[default]
    Keep,
    /// Every letter passes the turn, hit or miss.
    Pass,
}

/// How the host of the next round is chosen once a round finishes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HostRotation {
    /// Everybody hosts once before anybody hosts twice.
    #[default]
    Fair,
    /// The winner hosts; after a loss the seat after the current host does.
    WinnerHosts,
}

/// Who is holding the room open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomVariant {
    /// A shared display created the room; players only use their own
    /// devices to act.
    Tv,
    /// Players created the room among themselves.
    Peer,
}

impl RoomVariant {
    pub fn min_players(self) -> usize {
        match self {
            RoomVariant::Tv => 3,
            RoomVariant::Peer => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRules {
    pub min_players: usize,
    pub turn_on_hit: TurnOnHit,
    pub host_rotation: HostRotation,
}

impl GameRules {
    pub fn for_variant(variant: RoomVariant) -> Self {
        Self {
            min_players: variant.min_players(),
            turn_on_hit: TurnOnHit::default(),
            host_rotation: HostRotation::default(),
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::for_variant(RoomVariant::Tv)
    }
}

// -- Commands --

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Setup,
    Playing,
    Finished,
}

/// Everything that can change a room. The actor is passed alongside the
/// command; `PlayerJoined` and `PlayerLeft` are issued by the server on the
/// player's behalf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    PlayerJoined { name: String, global_wins: u32 },
    PlayerLeft { player_id: Uuid },
    StartGame,
    SubmitWord { word: String, hint: String },
    GuessLetter { letter: char },
    StartFullWordGuess,
    SubmitFullWordGuess { guess: String },
    CancelFullWordGuess,
    StartNextRound,
}

// -- Room State Machine --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomState {
    pub phase: Phase,
    pub rules: GameRules,
    pub players: Vec<Player>,
    /// Lobby leader while in `Lobby`, round host afterwards.
    pub host_id: Option<Uuid>,
    pub word: String,
    pub hint: String,
    pub mask: Vec<char>,
    pub used_letters: Vec<char>,
    pub mistakes: u8,
    pub turn_player_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub is_guessing: bool,
    pub guesser_id: Option<Uuid>,
    pub past_hosts: Vec<Uuid>,
    pub next_host_id: Option<Uuid>,
    pub round: u32,
    /// Bumped on every applied command.
    pub version: u64,
}

impl RoomState {
    pub fn new(rules: GameRules) -> Self {
        Self {
            phase: Phase::Lobby,
            rules,
            players: Vec::new(),
            host_id: None,
            word: String::new(),
            hint: String::new(),
            mask: Vec::new(),
            used_letters: Vec::new(),
            mistakes: 0,
            turn_player_id: None,
            winner_id: None,
            is_guessing: false,
            guesser_id: None,
            past_hosts: Vec::new(),
            next_host_id: None,
            round: 0,
            version: 0,
        }
    }

    /// The transition function. Returns the next state, or a rejection that
    /// leaves `self` untouched.
    pub fn apply(&self, actor: Uuid, command: Command) -> Result<RoomState, GameError> {
        let mut next = self.clone();
        match command {
            Command::PlayerJoined { name, global_wins } => next.join(actor, name, global_wins)?,
            Command::PlayerLeft { player_id } => next.leave(player_id)?,
            Command::StartGame => next.start_game(actor)?,
            Command::SubmitWord { word, hint } => next.submit_word(actor, &word, &hint)?,
            Command::GuessLetter { letter } => next.guess_letter(actor, letter)?,
            Command::StartFullWordGuess => next.start_full_word_guess(actor)?,
            Command::SubmitFullWordGuess { guess } => next.submit_full_word_guess(actor, &guess)?,
            Command::CancelFullWordGuess => next.cancel_full_word_guess(actor)?,
            Command::StartNextRound => next.start_next_round(actor)?,
        }
        next.version += 1;
        Ok(next)
    }

    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_member(&self, id: Uuid) -> bool {
        self.player(id).is_some()
    }

    pub fn is_host(&self, id: Uuid) -> bool {
        self.host_id == Some(id)
    }

    pub fn eligible_guessers(&self) -> Vec<Uuid> {
        turn::eligible_guessers(&self.players, self.host_id)
    }

    pub fn is_revealed(&self) -> bool {
        !self.mask.is_empty() && !self.mask.contains(&BLANK)
    }

    // -- Roster --

    fn join(&mut self, id: Uuid, name: String, global_wins: u32) -> Result<(), GameError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(GameError::InvalidName);
        }
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.name = name,
            None => self
                .players
                .push(Player::new(id, name).with_global_wins(global_wins)),
        }
        if self.host_id.is_none() {
            self.host_id = Some(id);
        }
        Ok(())
    }

    fn leave(&mut self, id: Uuid) -> Result<(), GameError> {
        if !self.is_member(id) {
            return Err(GameError::UnknownPlayer);
        }
        self.players.retain(|p| p.id != id);
        self.past_hosts.retain(|h| *h != id);

        if self.players.is_empty() {
            *self = RoomState {
                round: self.round,
                version: self.version,
                ..RoomState::new(self.rules)
            };
            return Ok(());
        }

        if self.guesser_id == Some(id) {
            self.release_guess_lock();
        }

        match self.phase {
            Phase::Lobby | Phase::Setup => {
                let host_left = self.host_id == Some(id);
                if host_left {
                    self.host_id = self.players.first().map(|p| p.id);
                }
                // A host with nobody left to guess could never submit a word.
                let stranded = turn::first_guesser(&self.players, self.host_id).is_none();
                if self.phase == Phase::Setup && (host_left || stranded) {
                    self.reset_round();
                    self.phase = Phase::Lobby;
                }
            }
            Phase::Playing => {
                if self.turn_player_id == Some(id) {
                    self.advance_turn_from(id);
                }
            }
            Phase::Finished => {
                if self.next_host_id == Some(id) {
                    self.next_host_id = self.choose_next_host();
                }
            }
        }
        Ok(())
    }

    // -- Round setup --

    fn start_game(&mut self, actor: Uuid) -> Result<(), GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhase);
        }
        let leader = self
            .host_id
            .filter(|id| self.is_member(*id))
            .or_else(|| self.players.first().map(|p| p.id));
        if leader != Some(actor) {
            return Err(GameError::NotYourTurn);
        }
        if self.players.len() < self.rules.min_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.rules.min_players,
            });
        }
        self.begin_setup(actor);
        Ok(())
    }

    fn submit_word(&mut self, actor: Uuid, word: &str, hint: &str) -> Result<(), GameError> {
        if self.phase != Phase::Setup {
            return Err(GameError::WrongPhase);
        }
        if !self.is_host(actor) {
            return Err(GameError::NotYourTurn);
        }
        let word = normalize_word(word);
        if !normalize::is_playable(&word) {
            return Err(GameError::InvalidWord);
        }
        let hint = hint.trim();
        if hint.is_empty() {
            return Err(GameError::InvalidHint);
        }
        let first = turn::first_guesser(&self.players, self.host_id).ok_or(
            GameError::NotEnoughPlayers {
                needed: self.rules.min_players,
            },
        )?;

        self.mask = word
            .chars()
            .map(|c| if c == ' ' { ' ' } else { BLANK })
            .collect();
        self.word = word;
        self.hint = hint.to_string();
        self.used_letters.clear();
        self.mistakes = 0;
        self.winner_id = None;
        self.next_host_id = None;
        self.release_guess_lock();
        self.turn_player_id = Some(first);
        self.phase = Phase::Playing;
        Ok(())
    }

    fn start_next_round(&mut self, actor: Uuid) -> Result<(), GameError> {
        if self.phase != Phase::Finished {
            return Err(GameError::WrongPhase);
        }
        if self.next_host_id != Some(actor) {
            return Err(GameError::NotYourTurn);
        }
        self.begin_setup(actor);
        Ok(())
    }

    fn begin_setup(&mut self, host: Uuid) {
        self.reset_round();
        self.host_id = Some(host);
        self.next_host_id = None;
        self.round += 1;
        self.phase = Phase::Setup;
    }

    fn reset_round(&mut self) {
        self.word.clear();
        self.hint.clear();
        self.mask.clear();
        self.used_letters.clear();
        self.mistakes = 0;
        self.turn_player_id = None;
        self.winner_id = None;
        self.release_guess_lock();
    }

    // -- Guessing --

    fn guess_letter(&mut self, actor: Uuid, letter: char) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::WrongPhase);
        }
        if self.is_guessing {
            return Err(GameError::LockConflict);
        }
        if self.turn_player_id != Some(actor) {
            return Err(GameError::NotYourTurn);
        }
        let letter = normalize_letter(letter).ok_or(GameError::InvalidLetter)?;
        if self.used_letters.contains(&letter) {
            return Err(GameError::AlreadyGuessed);
        }

        self.used_letters.push(letter);

        if self.word.contains(letter) {
            for (cell, c) in self.mask.iter_mut().zip(self.word.chars()) {
                if c == letter {
                    *cell = letter;
                }
            }
            if self.is_revealed() {
                self.finish(Some(actor));
            } else if self.rules.turn_on_hit == TurnOnHit::Pass {
                self.advance_turn_from(actor);
            }
        } else {
            self.mistakes += 1;
            if self.mistakes >= MAX_MISTAKES {
                self.finish(None);
            } else {
                self.advance_turn_from(actor);
            }
        }
        Ok(())
    }

    fn start_full_word_guess(&mut self, actor: Uuid) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::WrongPhase);
        }
        if self.is_host(actor) {
            return Err(GameError::NotYourTurn);
        }
        if !self.is_member(actor) {
            return Err(GameError::UnknownPlayer);
        }
        if self.is_guessing {
            return Err(GameError::LockConflict);
        }
        self.is_guessing = true;
        self.guesser_id = Some(actor);
        Ok(())
    }

    fn submit_full_word_guess(&mut self, actor: Uuid, guess: &str) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::WrongPhase);
        }
        if !self.is_guessing || self.guesser_id != Some(actor) {
            return Err(GameError::NotLockHolder);
        }
        let guess = normalize_word(guess);
        if !normalize::is_playable(&guess) {
            return Err(GameError::InvalidWord);
        }

        self.release_guess_lock();

        if guess == self.word {
            self.mask = self.word.chars().collect();
            self.finish(Some(actor));
        } else {
            if let Some(p) = self.players.iter_mut().find(|p| p.id == actor) {
                p.forfeit_win();
            }
            if self.turn_player_id == Some(actor) {
                self.advance_turn_from(actor);
            }
        }
        Ok(())
    }

    fn cancel_full_word_guess(&mut self, actor: Uuid) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::WrongPhase);
        }
        if !self.is_guessing || self.guesser_id != Some(actor) {
            return Err(GameError::NotLockHolder);
        }
        self.release_guess_lock();
        Ok(())
    }

    fn release_guess_lock(&mut self) {
        self.is_guessing = false;
        self.guesser_id = None;
    }

    fn advance_turn_from(&mut self, from: Uuid) {
        match turn::next_guesser(&self.players, self.host_id, from) {
            Some(next) => self.turn_player_id = Some(next),
            None => self.finish(None),
        }
    }

    // -- Round end --

    fn finish(&mut self, winner: Option<Uuid>) {
        self.phase = Phase::Finished;
        self.turn_player_id = None;
        self.release_guess_lock();
        self.winner_id = winner;
        if let Some(id) = winner {
            if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
                p.award_win();
            }
        }
        self.next_host_id = self.choose_next_host();
    }

    fn choose_next_host(&mut self) -> Option<Uuid> {
        match self.rules.host_rotation {
            HostRotation::Fair => {
                if let Some(host) = self.host_id {
                    if !self.past_hosts.contains(&host) {
                        self.past_hosts.push(host);
                    }
                }
                let candidate = self
                    .players
                    .iter()
                    .map(|p| p.id)
                    .find(|id| !self.past_hosts.contains(id));
                match candidate {
                    Some(id) => Some(id),
                    // Everyone has hosted; start a new cycle without
                    // handing the current host a second round in a row.
                    None => {
                        self.past_hosts.clear();
                        turn::next_in_roster(&self.players, self.host_id)
                    }
                }
            }
            HostRotation::WinnerHosts => self
                .winner_id
                .filter(|id| self.is_member(*id))
                .or_else(|| turn::next_in_roster(&self.players, self.host_id)),
        }
    }

    // -- Projection --

    /// The state as `viewer` may see it. The secret word is only included
    /// for the round host or once the round is over.
    pub fn snapshot_for(&self, viewer: Option<Uuid>) -> GameSnapshot {
        let reveal_word = self.phase == Phase::Finished
            || (self.phase == Phase::Playing && viewer.is_some() && viewer == self.host_id);
        GameSnapshot {
            phase: self.phase.clone(),
            rules: self.rules,
            players: self.players.clone(),
            host_id: self.host_id,
            word: reveal_word.then(|| self.word.clone()),
            hint: self.hint.clone(),
            mask: self.mask.clone(),
            used_letters: self.used_letters.clone(),
            mistakes: self.mistakes,
            turn_player_id: self.turn_player_id,
            winner_id: self.winner_id,
            is_guessing: self.is_guessing,
            guesser_id: self.guesser_id,
            next_host_id: self.next_host_id,
            round: self.round,
            version: self.version,
        }
    }
}

// -- Snapshot (sent over the network) --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Unused,
    Hit,
    Miss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub rules: GameRules,
    pub players: Vec<Player>,
    pub host_id: Option<Uuid>,
    pub word: Option<String>,
    pub hint: String,
    pub mask: Vec<char>,
    pub used_letters: Vec<char>,
    pub mistakes: u8,
    pub turn_player_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub is_guessing: bool,
    pub guesser_id: Option<Uuid>,
    pub next_host_id: Option<Uuid>,
    pub round: u32,
    pub version: u64,
}

impl GameSnapshot {
    /// Keyboard coloring. A used letter is a hit exactly when it shows up
    /// in the mask, since a hit reveals every occurrence.
    pub fn key_state(&self, letter: char) -> KeyState {
        if !self.used_letters.contains(&letter) {
            KeyState::Unused
        } else if self.mask.contains(&letter) {
            KeyState::Hit
        } else {
            KeyState::Miss
        }
    }

    pub fn player_name(&self, id: Option<Uuid>) -> Option<&str> {
        let id = id?;
        self.players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    pub fn is_host(&self, id: Uuid) -> bool {
        self.host_id == Some(id)
    }

    pub fn is_turn(&self, id: Uuid) -> bool {
        self.turn_player_id == Some(id)
    }

    pub fn mistakes_left(&self) -> u8 {
        MAX_MISTAKES.saturating_sub(self.mistakes)
    }
}

// -- Errors --

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("word must have at least {} letters", normalize::MIN_WORD_LEN)]
    InvalidWord,
    #[error("hint must not be empty")]
    InvalidHint,
    #[error("not a letter")]
    InvalidLetter,
    #[error("name must not be empty")]
    InvalidName,
    #[error("not your turn")]
    NotYourTurn,
    #[error("letter already guessed")]
    AlreadyGuessed,
    #[error("not allowed in this phase")]
    WrongPhase,
    #[error("someone is guessing the word")]
    LockConflict,
    #[error("you are not the one guessing the word")]
    NotLockHolder,
    #[error("not enough players (need {needed})")]
    NotEnoughPlayers { needed: usize },
    #[error("player is not in this room")]
    UnknownPlayer,
    #[error("room not found")]
    RoomNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn room_with(n: usize, rules: GameRules) -> (RoomState, Vec<Uuid>) {
        let mut room = RoomState::new(rules);
        let ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            room = room
                .apply(
                    *id,
                    Command::PlayerJoined {
                        name: format!("Player{}", i + 1),
                        global_wins: 0,
                    },
                )
                .unwrap();
        }
        (room, ids)
    }

    /// Lobby -> Setup -> Playing with ids[0] hosting `word`.
    fn playing(n: usize, word: &str) -> (RoomState, Vec<Uuid>) {
        playing_with(n, word, GameRules::for_variant(RoomVariant::Tv))
    }

    fn playing_with(n: usize, word: &str, rules: GameRules) -> (RoomState, Vec<Uuid>) {
        let (room, ids) = room_with(n, rules);
        let room = room.apply(ids[0], Command::StartGame).unwrap();
        let room = room
            .apply(
                ids[0],
                Command::SubmitWord {
                    word: word.into(),
                    hint: "a hint".into(),
                },
            )
            .unwrap();
        (room, ids)
    }

    fn letter(room: &RoomState, actor: Uuid, c: char) -> Result<RoomState, GameError> {
        room.apply(actor, Command::GuessLetter { letter: c })
    }

    fn assert_invariants(room: &RoomState) {
        if !room.word.is_empty() {
            assert_eq!(room.mask.len(), room.word.len());
            for (m, w) in room.mask.iter().zip(room.word.chars()) {
                assert!(*m == w || *m == BLANK, "mask cell {m:?} for {w:?}");
                assert_eq!(*m == ' ', w == ' ');
            }
        }
        assert!(room.mistakes <= MAX_MISTAKES);
        match room.phase {
            Phase::Playing => {
                assert!(room.mistakes < MAX_MISTAKES);
                let turn = room.turn_player_id.expect("turn while playing");
                assert_ne!(Some(turn), room.host_id);
                assert!(room.is_member(turn));
                assert!(!room.is_revealed());
            }
            Phase::Finished => {
                assert!(room.turn_player_id.is_none());
                if room.is_revealed() {
                    assert!(room.winner_id.is_some());
                }
                if room.mistakes == MAX_MISTAKES {
                    assert!(room.winner_id.is_none());
                }
            }
            Phase::Lobby | Phase::Setup => {
                assert!(room.turn_player_id.is_none());
                assert!(room.word.is_empty());
            }
        }
        if room.is_guessing {
            assert!(room.guesser_id.is_some());
        }
    }

    #[test]
    fn test_first_joiner_leads_the_lobby() {
        let (room, ids) = room_with(3, GameRules::default());
        assert_eq!(room.phase, Phase::Lobby);
        assert_eq!(room.host_id, Some(ids[0]));
        assert_eq!(room.players.len(), 3);
        assert_eq!(room.version, 3);
    }

    #[test]
    fn test_rejoin_updates_name_without_duplicating() {
        let (room, ids) = room_with(2, GameRules::default());
        let room = room
            .apply(
                ids[1],
                Command::PlayerJoined {
                    name: "  Renamed ".into(),
                    global_wins: 9,
                },
            )
            .unwrap();
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.player(ids[1]).unwrap().name, "Renamed");
        assert_eq!(room.player(ids[1]).unwrap().global_wins, 0);
    }

    #[test]
    fn test_join_seeds_global_wins() {
        let mut room = RoomState::new(GameRules::default());
        let id = Uuid::new_v4();
        room = room
            .apply(
                id,
                Command::PlayerJoined {
                    name: "Ana".into(),
                    global_wins: 7,
                },
            )
            .unwrap();
        assert_eq!(room.player(id).unwrap().global_wins, 7);
        assert_eq!(room.player(id).unwrap().wins, 0);
    }

    #[test]
    fn test_start_game_requires_min_players() {
        let (room, ids) = room_with(2, GameRules::for_variant(RoomVariant::Tv));
        assert_eq!(
            room.apply(ids[0], Command::StartGame).unwrap_err(),
            GameError::NotEnoughPlayers { needed: 3 }
        );

        let (room, ids) = room_with(2, GameRules::for_variant(RoomVariant::Peer));
        let room = room.apply(ids[0], Command::StartGame).unwrap();
        assert_eq!(room.phase, Phase::Setup);
        assert_eq!(room.host_id, Some(ids[0]));
        assert_eq!(room.round, 1);
    }

    #[test]
    fn test_only_leader_starts_game() {
        let (room, ids) = room_with(3, GameRules::default());
        assert_eq!(
            room.apply(ids[1], Command::StartGame).unwrap_err(),
            GameError::NotYourTurn
        );
    }

    #[test]
    fn test_submit_word_builds_mask_and_first_turn() {
        let (room, ids) = playing(3, "guarda sol");
        assert_eq!(room.phase, Phase::Playing);
        assert_eq!(room.word, "GUARDA SOL");
        assert_eq!(room.hint, "a hint");
        assert_eq!(
            room.mask,
            vec!['_', '_', '_', '_', '_', '_', ' ', '_', '_', '_']
        );
        assert_eq!(room.turn_player_id, Some(ids[1]));
        assert!(room.used_letters.is_empty());
        assert_eq!(room.mistakes, 0);
        assert_invariants(&room);
    }

    #[test]
    fn test_submit_word_normalizes_diacritics() {
        let (room, _) = playing(3, "Maracujá");
        assert_eq!(room.word, "MARACUJA");
    }

    #[test]
    fn test_submit_word_rejects_short_or_empty() {
        let (room, ids) = room_with(3, GameRules::default());
        let room = room.apply(ids[0], Command::StartGame).unwrap();
        for bad in ["", "   ", "a", "1234", "é!"] {
            let err = room
                .apply(
                    ids[0],
                    Command::SubmitWord {
                        word: bad.into(),
                        hint: "hint".into(),
                    },
                )
                .unwrap_err();
            assert_eq!(err, GameError::InvalidWord, "word {bad:?}");
        }
        assert_eq!(room.phase, Phase::Setup);
        assert!(room.word.is_empty());
    }

    #[test]
    fn test_submit_word_requires_hint() {
        let (room, ids) = room_with(3, GameRules::default());
        let room = room.apply(ids[0], Command::StartGame).unwrap();
        let err = room
            .apply(
                ids[0],
                Command::SubmitWord {
                    word: "banana".into(),
                    hint: "  ".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err, GameError::InvalidHint);
    }

    #[test]
    fn test_submit_word_host_only() {
        let (room, ids) = room_with(3, GameRules::default());
        let room = room.apply(ids[0], Command::StartGame).unwrap();
        let err = room
            .apply(
                ids[1],
                Command::SubmitWord {
                    word: "banana".into(),
                    hint: "fruit".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
    }

    #[test]
    fn test_host_never_self_guesses() {
        let (room, ids) = playing(3, "banana");
        let host = ids[0];
        assert_eq!(
            room.apply(
                host,
                Command::SubmitWord {
                    word: "other".into(),
                    hint: "x".into()
                }
            )
            .unwrap_err(),
            GameError::WrongPhase
        );
        assert_eq!(
            room.apply(host, Command::StartFullWordGuess).unwrap_err(),
            GameError::NotYourTurn
        );
        assert_eq!(letter(&room, host, 'B').unwrap_err(), GameError::NotYourTurn);
    }

    #[test]
    fn test_hit_keeps_turn() {
        let (room, ids) = playing(3, "banana");
        let room = letter(&room, ids[1], 'B').unwrap();
        assert_eq!(room.mask, vec!['B', '_', '_', '_', '_', '_']);
        assert_eq!(room.mistakes, 0);
        assert_eq!(room.turn_player_id, Some(ids[1]));
        assert_eq!(room.used_letters, vec!['B']);
        assert_invariants(&room);
    }

    #[test]
    fn test_hit_reveals_every_occurrence() {
        let (room, ids) = playing(3, "banana");
        let room = letter(&room, ids[1], 'a').unwrap();
        assert_eq!(room.mask, vec!['_', 'A', '_', 'A', '_', 'A']);
    }

    #[test]
    fn test_hit_passes_turn_when_configured() {
        let rules = GameRules {
            turn_on_hit: TurnOnHit::Pass,
            ..GameRules::default()
        };
        let (room, ids) = playing_with(3, "banana", rules);
        let room = letter(&room, ids[1], 'B').unwrap();
        assert_eq!(room.turn_player_id, Some(ids[2]));
    }

    #[test]
    fn test_miss_advances_turn_round_robin() {
        let (room, ids) = playing(4, "banana");
        let room = letter(&room, ids[1], 'Z').unwrap();
        assert_eq!(room.mistakes, 1);
        assert_eq!(room.turn_player_id, Some(ids[2]));
        let room = letter(&room, ids[2], 'Y').unwrap();
        assert_eq!(room.turn_player_id, Some(ids[3]));
        let room = letter(&room, ids[3], 'X').unwrap();
        assert_eq!(room.turn_player_id, Some(ids[1]));
        assert_invariants(&room);
    }

    #[test]
    fn test_sixth_mistake_loses() {
        let (mut room, ids) = playing(3, "banana");
        room.mistakes = 5;
        let room = letter(&room, ids[1], 'Z').unwrap();
        assert_eq!(room.mistakes, MAX_MISTAKES);
        assert_eq!(room.phase, Phase::Finished);
        assert_eq!(room.winner_id, None);
        assert_eq!(room.turn_player_id, None);
        assert_invariants(&room);
    }

    #[test]
    fn test_revealing_last_letter_wins() {
        let (mut room, ids) = playing(3, "abacaxi");
        let guesser = ids[1];
        for c in ['A', 'B', 'C', 'X', 'I'] {
            room = letter(&room, guesser, c).unwrap();
        }
        assert!(!room.mask.contains(&BLANK));
        assert_eq!(room.phase, Phase::Finished);
        assert_eq!(room.winner_id, Some(guesser));
        let p = room.player(guesser).unwrap();
        assert_eq!(p.wins, 1);
        assert_eq!(p.global_wins, 1);
        assert_invariants(&room);
    }

    #[test]
    fn test_idempotent_letter_guess() {
        let (room, ids) = playing(3, "banana");
        let room = letter(&room, ids[1], 'N').unwrap();
        let err = letter(&room, ids[1], 'n').unwrap_err();
        assert_eq!(err, GameError::AlreadyGuessed);

        // After a miss the next guesser cannot reuse the letter either.
        let room = letter(&room, ids[1], 'Q').unwrap();
        assert_eq!(room.turn_player_id, Some(ids[2]));
        let before = room.version;
        assert_eq!(letter(&room, ids[2], 'Q').unwrap_err(), GameError::AlreadyGuessed);
        assert_eq!(room.version, before);
        assert_eq!(room.mistakes, 1);
    }

    #[test]
    fn test_non_letter_rejected() {
        let (room, ids) = playing(3, "banana");
        assert_eq!(letter(&room, ids[1], '3').unwrap_err(), GameError::InvalidLetter);
    }

    #[test]
    fn test_wrong_player_and_wrong_phase() {
        let (room, ids) = playing(3, "banana");
        assert_eq!(letter(&room, ids[2], 'B').unwrap_err(), GameError::NotYourTurn);

        let (lobby, ids) = room_with(3, GameRules::default());
        assert_eq!(letter(&lobby, ids[1], 'B').unwrap_err(), GameError::WrongPhase);
    }

    #[test]
    fn test_full_word_guess_wins_out_of_turn() {
        let (mut room, ids) = playing(4, "banana");
        room.mistakes = 5;
        let outsider = ids[3];
        assert_ne!(room.turn_player_id, Some(outsider));
        let room = room.apply(outsider, Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(
                outsider,
                Command::SubmitFullWordGuess {
                    guess: " banana ".into(),
                },
            )
            .unwrap();
        assert_eq!(room.phase, Phase::Finished);
        assert_eq!(room.winner_id, Some(outsider));
        assert_eq!(room.mask, "BANANA".chars().collect::<Vec<_>>());
        assert!(!room.is_guessing);
        assert_eq!(room.guesser_id, None);
        assert_eq!(room.player(outsider).unwrap().wins, 1);
        assert_invariants(&room);
    }

    #[test]
    fn test_wrong_guess_out_of_turn() {
        let (room, ids) = playing(4, "banana");
        let mut room = room;
        room.players[3].wins = 2;
        room.players[3].global_wins = 0;
        let turn_before = room.turn_player_id;

        let room = room.apply(ids[3], Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(
                ids[3],
                Command::SubmitFullWordGuess {
                    guess: "WRONG".into(),
                },
            )
            .unwrap();

        let p = room.player(ids[3]).unwrap();
        assert_eq!(p.wins, 1);
        assert_eq!(p.global_wins, 0);
        assert_eq!(room.turn_player_id, turn_before);
        assert_eq!(room.phase, Phase::Playing);
        assert!(!room.is_guessing);
        assert_eq!(room.mistakes, 0);
        for other in &ids[..3] {
            assert_eq!(room.player(*other).unwrap().wins, 0);
        }
    }

    #[test]
    fn test_wrong_guess_by_turn_holder_passes_turn() {
        let (room, ids) = playing(3, "banana");
        let room = room.apply(ids[1], Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(
                ids[1],
                Command::SubmitFullWordGuess {
                    guess: "bandana".into(),
                },
            )
            .unwrap();
        assert_eq!(room.turn_player_id, Some(ids[2]));
    }

    #[test]
    fn test_guess_lock_blocks_letters_and_second_guesser() {
        let (room, ids) = playing(4, "banana");
        let room = room.apply(ids[2], Command::StartFullWordGuess).unwrap();
        assert!(room.is_guessing);
        assert_eq!(room.guesser_id, Some(ids[2]));

        assert_eq!(letter(&room, ids[1], 'B').unwrap_err(), GameError::LockConflict);
        assert_eq!(
            room.apply(ids[3], Command::StartFullWordGuess).unwrap_err(),
            GameError::LockConflict
        );
        assert_eq!(
            room.apply(
                ids[3],
                Command::SubmitFullWordGuess {
                    guess: "banana".into()
                }
            )
            .unwrap_err(),
            GameError::NotLockHolder
        );
    }

    #[test]
    fn test_empty_full_guess_keeps_lock() {
        let (room, ids) = playing(3, "banana");
        let room = room.apply(ids[2], Command::StartFullWordGuess).unwrap();
        let err = room
            .apply(ids[2], Command::SubmitFullWordGuess { guess: "!!".into() })
            .unwrap_err();
        assert_eq!(err, GameError::InvalidWord);
        assert!(room.is_guessing);
    }

    #[test]
    fn test_cancel_full_guess_releases_lock_without_penalty() {
        let (mut room, ids) = playing(3, "banana");
        room.players[2].wins = 1;
        let room = room.apply(ids[2], Command::StartFullWordGuess).unwrap();
        assert_eq!(
            room.apply(ids[1], Command::CancelFullWordGuess).unwrap_err(),
            GameError::NotLockHolder
        );
        let room = room.apply(ids[2], Command::CancelFullWordGuess).unwrap();
        assert!(!room.is_guessing);
        assert_eq!(room.player(ids[2]).unwrap().wins, 1);
        let room = letter(&room, ids[1], 'B').unwrap();
        assert_eq!(room.mask[0], 'B');
    }

    #[test]
    fn test_fair_rotation_visits_everyone() {
        let (mut room, ids) = playing(3, "banana");
        let mut hosts = vec![room.host_id.unwrap()];
        for _ in 0..3 {
            let guesser = room.turn_player_id.unwrap();
            room = room.apply(guesser, Command::StartFullWordGuess).unwrap();
            room = room
                .apply(
                    guesser,
                    Command::SubmitFullWordGuess {
                        guess: room.word.clone(),
                    },
                )
                .unwrap();
            let next = room.next_host_id.unwrap();
            room = room.apply(next, Command::StartNextRound).unwrap();
            room = room
                .apply(
                    next,
                    Command::SubmitWord {
                        word: "banana".into(),
                        hint: "fruit".into(),
                    },
                )
                .unwrap();
            hosts.push(next);
        }
        assert_eq!(hosts, vec![ids[0], ids[1], ids[2], ids[0]]);
        assert_eq!(room.round, 4);
    }

    #[test]
    fn test_winner_hosts_rotation() {
        let rules = GameRules {
            host_rotation: HostRotation::WinnerHosts,
            ..GameRules::default()
        };
        let (room, ids) = playing_with(3, "ab", rules);
        let room = letter(&room, ids[1], 'A').unwrap();
        let room = letter(&room, ids[1], 'B').unwrap();
        assert_eq!(room.next_host_id, Some(ids[1]));

        let (mut room, ids) = playing_with(3, "ab", rules);
        room.mistakes = 5;
        let room = letter(&room, ids[1], 'Z').unwrap();
        assert_eq!(room.winner_id, None);
        assert_eq!(room.next_host_id, Some(ids[1]));
    }

    #[test]
    fn test_start_next_round_resets_round_fields() {
        let (room, ids) = playing(3, "banana");
        let room = letter(&room, ids[1], 'Z').unwrap();
        let room = room.apply(ids[1], Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(
                ids[1],
                Command::SubmitFullWordGuess {
                    guess: "banana".into(),
                },
            )
            .unwrap();
        let next = room.next_host_id.unwrap();
        assert_eq!(
            room.apply(ids[2], Command::StartNextRound).unwrap_err(),
            GameError::NotYourTurn
        );
        let room = room.apply(next, Command::StartNextRound).unwrap();

        assert_eq!(room.phase, Phase::Setup);
        assert_eq!(room.host_id, Some(next));
        assert_eq!(room.next_host_id, None);
        assert!(room.word.is_empty());
        assert!(room.hint.is_empty());
        assert!(room.mask.is_empty());
        assert!(room.used_letters.is_empty());
        assert_eq!(room.mistakes, 0);
        assert_eq!(room.winner_id, None);
        assert!(!room.is_guessing);
        assert_eq!(room.guesser_id, None);
        assert_eq!(room.turn_player_id, None);
        // wins survive the reset
        assert_eq!(room.player(ids[1]).unwrap().wins, 1);
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let (room, ids) = playing(3, "banana");
        let before = serde_json::to_string(&room).unwrap();
        let _ = letter(&room, ids[2], 'B');
        let _ = room.apply(ids[0], Command::StartNextRound);
        let _ = room.apply(ids[0], Command::StartFullWordGuess);
        assert_eq!(serde_json::to_string(&room).unwrap(), before);
    }

    #[test]
    fn test_leader_leaving_lobby_hands_over() {
        let (room, ids) = room_with(3, GameRules::default());
        let room = room
            .apply(ids[0], Command::PlayerLeft { player_id: ids[0] })
            .unwrap();
        assert_eq!(room.host_id, Some(ids[1]));
        assert_eq!(room.phase, Phase::Lobby);
    }

    #[test]
    fn test_host_leaving_setup_reverts_to_lobby() {
        let (room, ids) = room_with(3, GameRules::default());
        let room = room.apply(ids[0], Command::StartGame).unwrap();
        let room = room
            .apply(ids[0], Command::PlayerLeft { player_id: ids[0] })
            .unwrap();
        assert_eq!(room.phase, Phase::Lobby);
        assert_eq!(room.host_id, Some(ids[1]));
        assert_invariants(&room);
    }

    #[test]
    fn test_setup_without_guessers_reverts_to_lobby() {
        let rules = GameRules {
            min_players: 2,
            ..GameRules::default()
        };
        let (room, ids) = room_with(3, rules);
        let room = room.apply(ids[0], Command::StartGame).unwrap();

        let room = room
            .apply(ids[1], Command::PlayerLeft { player_id: ids[1] })
            .unwrap();
        assert_eq!(room.phase, Phase::Setup);

        let room = room
            .apply(ids[2], Command::PlayerLeft { player_id: ids[2] })
            .unwrap();
        assert_eq!(room.phase, Phase::Lobby);
        assert_eq!(room.host_id, Some(ids[0]));
        assert_invariants(&room);
    }

    #[test]
    fn test_turn_holder_leaving_passes_turn() {
        let (room, ids) = playing(4, "banana");
        assert_eq!(room.turn_player_id, Some(ids[1]));
        let room = room
            .apply(ids[1], Command::PlayerLeft { player_id: ids[1] })
            .unwrap();
        assert_eq!(room.turn_player_id, Some(ids[2]));
        assert_eq!(room.phase, Phase::Playing);
        assert_invariants(&room);
    }

    #[test]
    fn test_last_guesser_leaving_finishes_round() {
        let (room, ids) = playing(2, "banana");
        let room = room
            .apply(ids[1], Command::PlayerLeft { player_id: ids[1] })
            .unwrap();
        assert_eq!(room.phase, Phase::Finished);
        assert_eq!(room.winner_id, None);
        assert_eq!(room.next_host_id, Some(ids[0]));
        assert_invariants(&room);
    }

    #[test]
    fn test_lock_holder_leaving_clears_lock() {
        let (room, ids) = playing(4, "banana");
        let room = room.apply(ids[3], Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(ids[3], Command::PlayerLeft { player_id: ids[3] })
            .unwrap();
        assert!(!room.is_guessing);
        assert_eq!(room.guesser_id, None);
        assert_eq!(room.turn_player_id, Some(ids[1]));
    }

    #[test]
    fn test_next_host_leaving_is_replaced() {
        let (room, ids) = playing(4, "banana");
        let room = room.apply(ids[1], Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(
                ids[1],
                Command::SubmitFullWordGuess {
                    guess: "banana".into(),
                },
            )
            .unwrap();
        assert_eq!(room.next_host_id, Some(ids[1]));
        let room = room
            .apply(ids[1], Command::PlayerLeft { player_id: ids[1] })
            .unwrap();
        assert_eq!(room.next_host_id, Some(ids[2]));
    }

    #[test]
    fn test_last_player_leaving_resets_room() {
        let (room, ids) = playing(2, "banana");
        let room = room
            .apply(ids[1], Command::PlayerLeft { player_id: ids[1] })
            .unwrap();
        let room = room
            .apply(ids[0], Command::PlayerLeft { player_id: ids[0] })
            .unwrap();
        assert_eq!(room.phase, Phase::Lobby);
        assert!(room.players.is_empty());
        assert_eq!(room.host_id, None);
        assert!(room.past_hosts.is_empty());
        assert_eq!(
            room.apply(ids[0], Command::PlayerLeft { player_id: ids[0] })
                .unwrap_err(),
            GameError::UnknownPlayer
        );
    }

    #[test]
    fn test_snapshot_hides_word_from_guessers() {
        let (room, ids) = playing(3, "banana");
        assert_eq!(room.snapshot_for(Some(ids[1])).word, None);
        assert_eq!(room.snapshot_for(None).word, None);
        assert_eq!(
            room.snapshot_for(Some(ids[0])).word.as_deref(),
            Some("BANANA")
        );

        let room = room.apply(ids[1], Command::StartFullWordGuess).unwrap();
        let room = room
            .apply(
                ids[1],
                Command::SubmitFullWordGuess {
                    guess: "banana".into(),
                },
            )
            .unwrap();
        assert_eq!(room.snapshot_for(None).word.as_deref(), Some("BANANA"));
    }

    #[test]
    fn test_snapshot_key_state() {
        let (room, ids) = playing(3, "banana");
        let room = letter(&room, ids[1], 'N').unwrap();
        let room = letter(&room, ids[1], 'Z').unwrap();
        let snap = room.snapshot_for(None);
        assert_eq!(snap.key_state('N'), KeyState::Hit);
        assert_eq!(snap.key_state('Z'), KeyState::Miss);
        assert_eq!(snap.key_state('B'), KeyState::Unused);
        assert_eq!(snap.mistakes_left(), 5);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (room, _) = playing(3, "guarda sol");
        let json = serde_json::to_string(&room.snapshot_for(None)).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phase, Phase::Playing);
        assert_eq!(back.mask.len(), 10);
        assert_eq!(back.players.len(), 3);
    }

    #[test]
    fn test_random_play_preserves_invariants() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let alphabet: Vec<char> = ('A'..='Z').collect();

        for _ in 0..40 {
            let (mut room, ids) = playing(4, "guarda sol");
            assert_invariants(&room);
            for _ in 0..200 {
                if room.phase != Phase::Playing {
                    break;
                }
                let actor = *ids.choose(&mut rng).unwrap();
                let command = match rng.gen_range(0..10) {
                    0 => Command::StartFullWordGuess,
                    1 => Command::SubmitFullWordGuess {
                        guess: if rng.gen_bool(0.3) {
                            "guarda sol".into()
                        } else {
                            "guarda chuva".into()
                        },
                    },
                    2 => Command::CancelFullWordGuess,
                    3 if rng.gen_bool(0.1) => Command::PlayerLeft { player_id: actor },
                    _ => Command::GuessLetter {
                        letter: *alphabet.choose(&mut rng).unwrap(),
                    },
                };
                if let Ok(next) = room.apply(actor, command) {
                    assert!(next.version > room.version);
                    room = next;
                }
                assert_invariants(&room);
            }
        }
    }
}
