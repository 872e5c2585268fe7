use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use uuid::Uuid;

use gallows_common::game::{GameSnapshot, Phase};
use gallows_common::lobby::RoomCode;
use gallows_common::words::WordEntry;

use super::gallows_widget;
use super::keyboard_widget;
use super::ranking_widget;
use super::results;

const FLASH_DURATION: Duration = Duration::from_millis(1200);
const LOG_CAPACITY: usize = 50;

/// What the keyboard does on the game screen right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Read-only display.
    Watching,
    /// Someone else has to act (the host choosing a word, or guessers
    /// playing against the host).
    Waiting,
    Lobby,
    Setup,
    Guessing,
    FullGuess,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Word,
    Hint,
}

#[derive(Debug, Clone)]
pub struct GameScreen {
    pub my_id: Uuid,
    pub code: RoomCode,
    pub watching: bool,
    pub game: GameSnapshot,
    pub word_input: String,
    pub hint_input: String,
    pub setup_field: SetupField,
    pub guess_input: String,
    pub status_message: Option<String>,
    pub log: Vec<String>,
    /// Last letter result, highlighted for a moment.
    pub flash: Option<(bool, Instant)>,
}

impl GameScreen {
    pub fn new(my_id: Uuid, code: RoomCode, watching: bool, game: GameSnapshot) -> Self {
        Self {
            my_id,
            code,
            watching,
            game,
            word_input: String::new(),
            hint_input: String::new(),
            setup_field: SetupField::Word,
            guess_input: String::new(),
            status_message: None,
            log: Vec::new(),
            flash: None,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.watching {
            return InputMode::Watching;
        }
        match self.game.phase {
            Phase::Lobby => InputMode::Lobby,
            Phase::Setup if self.game.is_host(self.my_id) => InputMode::Setup,
            Phase::Setup => InputMode::Waiting,
            Phase::Playing if self.is_my_full_guess() => InputMode::FullGuess,
            Phase::Playing if self.game.is_host(self.my_id) => InputMode::Waiting,
            Phase::Playing => InputMode::Guessing,
            Phase::Finished => InputMode::Finished,
        }
    }

    fn is_my_full_guess(&self) -> bool {
        self.game.is_guessing && self.game.guesser_id == Some(self.my_id)
    }

    pub fn is_my_turn(&self) -> bool {
        self.game.is_turn(self.my_id)
    }

    /// Replace the snapshot, resetting local inputs the new state no
    /// longer needs.
    pub fn update(&mut self, game: GameSnapshot) {
        let new_round = game.round != self.game.round;
        self.game = game;
        if new_round || self.game.phase != Phase::Setup {
            self.word_input.clear();
            self.hint_input.clear();
            self.setup_field = SetupField::Word;
        }
        if !self.is_my_full_guess() {
            self.guess_input.clear();
        }
    }

    pub fn tick(&mut self) {
        if let Some((_, started)) = self.flash {
            if started.elapsed() >= FLASH_DURATION {
                self.flash = None;
            }
        }
    }

    pub fn flash_letter(&mut self, hit: bool) {
        self.flash = Some((hit, Instant::now()));
    }

    pub fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_CAPACITY {
            let overflow = self.log.len() - LOG_CAPACITY;
            self.log.drain(..overflow);
        }
    }

    pub fn type_char(&mut self, c: char) {
        match self.input_mode() {
            InputMode::Setup => match self.setup_field {
                SetupField::Word => self.word_input.push(c),
                SetupField::Hint => self.hint_input.push(c),
            },
            InputMode::FullGuess => self.guess_input.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.input_mode() {
            InputMode::Setup => {
                match self.setup_field {
                    SetupField::Word => self.word_input.pop(),
                    SetupField::Hint => self.hint_input.pop(),
                };
            }
            InputMode::FullGuess => {
                self.guess_input.pop();
            }
            _ => {}
        }
    }

    pub fn switch_field(&mut self) {
        self.setup_field = match self.setup_field {
            SetupField::Word => SetupField::Hint,
            SetupField::Hint => SetupField::Word,
        };
    }

    pub fn suggest(&mut self, entry: WordEntry) {
        self.word_input = entry.word.to_string();
        self.hint_input = entry.hint.to_string();
    }

    /// The typed word and hint, if both are filled in. Otherwise moves the
    /// cursor to the missing field.
    pub fn setup_submission(&mut self) -> Option<(String, String)> {
        if self.word_input.trim().is_empty() {
            self.setup_field = SetupField::Word;
            self.status_message = Some("Type a secret word first".into());
            return None;
        }
        if self.hint_input.trim().is_empty() {
            self.setup_field = SetupField::Hint;
            self.status_message = Some("Add a hint for the guessers".into());
            return None;
        }
        Some((self.word_input.clone(), self.hint_input.clone()))
    }

    pub fn guess_submission(&self) -> Option<String> {
        let guess = self.guess_input.trim();
        (!guess.is_empty()).then(|| guess.to_string())
    }

    pub fn draw(&self, frame: &mut Frame) {
        if self.watching {
            self.draw_display(frame);
        } else {
            self.draw_player(frame);
        }
    }

    fn draw_player(&self, frame: &mut Frame) {
        let area = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Title
                Constraint::Min(12),   // Phase panel
                Constraint::Length(4), // Actions
            ])
            .split(main_chunks[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(10)])
            .split(main_chunks[1]);

        self.draw_title_bar(frame, left_chunks[0]);
        match self.game.phase {
            Phase::Lobby => self.draw_waiting_room(frame, left_chunks[1]),
            Phase::Setup if self.game.is_host(self.my_id) => {
                self.draw_setup_form(frame, left_chunks[1])
            }
            Phase::Setup => self.draw_choosing(frame, left_chunks[1]),
            Phase::Playing => self.draw_board(frame, left_chunks[1], true),
            Phase::Finished => {
                results::draw_round_over(frame, left_chunks[1], &self.game, Some(self.my_id))
            }
        }
        self.draw_action_bar(frame, left_chunks[2]);

        let table = ranking_widget::build_ranking_table(&self.game, Some(self.my_id));
        frame.render_widget(table, right_chunks[0]);
        self.draw_log(frame, right_chunks[1]);
    }

    /// The shared screen: big room code, board and ranking, no input.
    fn draw_display(&self, frame: &mut Frame) {
        let area = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(12)])
            .split(main_chunks[0]);

        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                " GALLOWS ",
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Join with code ", Style::default().fg(Color::Rgb(180, 180, 200))),
            Span::styled(
                self.code.to_string(),
                Style::default()
                    .fg(Color::Rgb(100, 255, 150))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   Round {}", self.game.round),
                Style::default().fg(Color::Rgb(150, 150, 170)),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 80))),
        );
        frame.render_widget(banner, left_chunks[0]);

        match self.game.phase {
            Phase::Lobby => self.draw_waiting_room(frame, left_chunks[1]),
            Phase::Setup => self.draw_choosing(frame, left_chunks[1]),
            Phase::Playing => self.draw_board(frame, left_chunks[1], false),
            Phase::Finished => results::draw_round_over(frame, left_chunks[1], &self.game, None),
        }

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(10)])
            .split(main_chunks[1]);
        let table = ranking_widget::build_ranking_table(&self.game, None);
        frame.render_widget(table, right_chunks[0]);
        self.draw_log(frame, right_chunks[1]);
    }

    fn draw_title_bar(&self, frame: &mut Frame, area: Rect) {
        let host = self.game.player_name(self.game.host_id).unwrap_or("-");
        let mut spans = vec![
            Span::styled(
                " GALLOWS ",
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" Room {}  Round {}", self.code, self.game.round),
                Style::default().fg(Color::Rgb(150, 150, 170)),
            ),
            Span::styled("  |  ", Style::default().fg(Color::Rgb(80, 80, 100))),
            Span::styled("Host: ", Style::default().fg(Color::Rgb(150, 150, 170))),
            Span::styled(
                host.to_string(),
                Style::default().fg(Color::Rgb(200, 150, 255)),
            ),
        ];
        if self.game.phase == Phase::Playing {
            let turn_color = if self.is_my_turn() {
                Color::Rgb(100, 255, 150)
            } else {
                Color::Rgb(180, 180, 200)
            };
            spans.push(Span::styled("  |  ", Style::default().fg(Color::Rgb(80, 80, 100))));
            spans.push(Span::styled("Turn: ", Style::default().fg(Color::Rgb(150, 150, 170))));
            spans.push(Span::styled(
                self.game
                    .player_name(self.game.turn_player_id)
                    .unwrap_or("-")
                    .to_string(),
                Style::default().fg(turn_color).add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_waiting_room(&self, frame: &mut Frame, area: Rect) {
        let needed = self.game.rules.min_players;
        let have = self.game.players.len();
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Room code: ", Style::default().fg(Color::Rgb(180, 180, 200))),
                Span::styled(
                    self.code.to_string(),
                    Style::default()
                        .fg(Color::Rgb(100, 255, 150))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];
        for p in &self.game.players {
            lines.push(Line::from(Span::styled(
                format!("    {}", p.name),
                Style::default().fg(Color::Rgb(200, 200, 220)),
            )));
        }
        lines.push(Line::from(""));
        let (msg, color) = if have >= needed {
            ("  Ready to start!".to_string(), Color::Rgb(100, 255, 150))
        } else {
            (
                format!("  Waiting for players ({}/{})", have, needed),
                Color::Rgb(255, 200, 100),
            )
        };
        lines.push(Line::from(Span::styled(msg, Style::default().fg(color))));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
                .title(" Waiting Room ")
                .title_style(Style::default().fg(Color::Rgb(180, 180, 200))),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_choosing(&self, frame: &mut Frame, area: Rect) {
        let host = self.game.player_name(self.game.host_id).unwrap_or("The host");
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} is choosing a secret word...", host),
                Style::default()
                    .fg(Color::Rgb(200, 150, 255))
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 80))),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_setup_form(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3), // Word
                Constraint::Length(3), // Hint
                Constraint::Min(0),
            ])
            .split(area);

        let intro = Paragraph::new(Span::styled(
            "  You are the host. Pick a word for the others to guess.",
            Style::default().fg(Color::Rgb(180, 180, 200)),
        ));
        frame.render_widget(intro, chunks[0]);

        let fields = [
            (SetupField::Word, self.word_input.as_str(), " Secret Word ", chunks[1]),
            (SetupField::Hint, self.hint_input.as_str(), " Hint ", chunks[2]),
        ];
        for (field, value, label, rect) in fields {
            let border = if self.setup_field == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            let input = Paragraph::new(value).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(label),
            );
            frame.render_widget(input, rect);
        }

        let (rect, len) = match self.setup_field {
            SetupField::Word => (chunks[1], self.word_input.chars().count()),
            SetupField::Hint => (chunks[2], self.hint_input.chars().count()),
        };
        frame.set_cursor_position((rect.x + len as u16 + 1, rect.y + 1));
    }

    fn draw_board(&self, frame: &mut Frame, area: Rect, interactive: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10), // Gallows + word
                Constraint::Length(5),  // Keyboard
                Constraint::Min(0),
            ])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(10)])
            .split(chunks[0]);

        let mut gallows = gallows_widget::render_gallows(self.game.mistakes, false);
        gallows.push(gallows_widget::mistakes_line(self.game.mistakes));
        frame.render_widget(
            Paragraph::new(gallows).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Rgb(80, 80, 100))),
            ),
            top[0],
        );

        let mask_style = match self.flash {
            Some((true, _)) => Style::default()
                .fg(Color::Rgb(100, 255, 150))
                .add_modifier(Modifier::BOLD),
            Some((false, _)) => Style::default()
                .fg(Color::Rgb(255, 120, 120))
                .add_modifier(Modifier::BOLD),
            None => Style::default()
                .fg(Color::Rgb(230, 230, 240))
                .add_modifier(Modifier::BOLD),
        };
        let mut word_lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Hint: ", Style::default().fg(Color::Rgb(150, 150, 170))),
                Span::styled(
                    self.game.hint.clone(),
                    Style::default().fg(Color::Rgb(255, 200, 100)),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(format!("  {}", render_mask(&self.game.mask)), mask_style)),
        ];
        if let Some(ref word) = self.game.word {
            word_lines.push(Line::from(""));
            word_lines.push(Line::from(vec![
                Span::styled("  Your word: ", Style::default().fg(Color::Rgb(120, 120, 140))),
                Span::styled(word.clone(), Style::default().fg(Color::Rgb(200, 150, 255))),
            ]));
        }
        if self.game.is_guessing {
            let who = self.game.player_name(self.game.guesser_id).unwrap_or("Someone");
            word_lines.push(Line::from(""));
            word_lines.push(Line::from(Span::styled(
                format!("  {} is guessing the whole word!", who),
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            )));
        }
        frame.render_widget(
            Paragraph::new(word_lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
                    .title(" Word ")
                    .title_style(Style::default().fg(Color::Rgb(180, 180, 200))),
            ),
            top[1],
        );

        let enabled = interactive && self.is_my_turn() && !self.game.is_guessing;
        frame.render_widget(
            Paragraph::new(keyboard_widget::render_keyboard(&self.game, enabled)),
            chunks[1],
        );
    }

    fn draw_action_bar(&self, frame: &mut Frame, area: Rect) {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let label = |s: String| Span::styled(s, Style::default().fg(Color::Rgb(150, 150, 170)));

        let mut lines = Vec::new();
        let mut spans = vec![Span::raw("  ")];
        match self.input_mode() {
            InputMode::Lobby => {
                spans.push(key("[Enter]", Color::Rgb(100, 255, 150)));
                spans.push(label(" Start game  ".into()));
            }
            InputMode::Setup => {
                spans.push(key("[Enter]", Color::Rgb(100, 255, 150)));
                spans.push(label(" Submit  ".into()));
                spans.push(key("[Tab]", Color::Rgb(100, 200, 255)));
                spans.push(label(" Switch field  ".into()));
                spans.push(key("[Ctrl+R]", Color::Rgb(255, 200, 100)));
                spans.push(label(" Suggest  ".into()));
            }
            InputMode::Guessing => {
                if self.is_my_turn() {
                    spans.push(key("[A-Z]", Color::Rgb(100, 255, 150)));
                    spans.push(label(format!(
                        " Guess a letter ({} misses left)  ",
                        self.game.mistakes_left()
                    )));
                } else {
                    spans.push(label("Waiting for your turn...  ".into()));
                }
                spans.push(key("[!]", Color::Rgb(255, 220, 50)));
                spans.push(label(" Guess the word  ".into()));
            }
            InputMode::FullGuess => {
                spans.push(Span::styled(
                    format!("Your guess: {}", self.guess_input),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ));
                lines.push(Line::from(std::mem::take(&mut spans)));
                spans.push(Span::raw("  "));
                spans.push(key("[Enter]", Color::Rgb(100, 255, 150)));
                spans.push(label(" Submit  ".into()));
                spans.push(key("[Esc]", Color::Rgb(255, 150, 100)));
                spans.push(label(" Cancel".into()));
            }
            InputMode::Finished => {
                if self.game.next_host_id == Some(self.my_id) {
                    spans.push(key("[Enter]", Color::Rgb(100, 255, 150)));
                    spans.push(label(" Next round  ".into()));
                }
            }
            InputMode::Waiting | InputMode::Watching => {
                spans.push(label("Waiting...  ".into()));
            }
        }
        if self.input_mode() != InputMode::FullGuess {
            spans.push(key("[Esc]", Color::Rgb(255, 150, 100)));
            spans.push(label(" Leave  ".into()));
            spans.push(key("[?]", Color::Rgb(100, 200, 255)));
            spans.push(label(" Help".into()));
        }
        lines.push(Line::from(spans));

        if let Some(ref msg) = self.status_message {
            lines.push(Line::from(Span::styled(
                format!("  {}", msg),
                Style::default().fg(Color::Rgb(100, 200, 255)),
            )));
        }

        frame.render_widget(Paragraph::new(lines), area);

        if self.input_mode() == InputMode::FullGuess {
            let cursor_x = area.x + 14 + self.guess_input.chars().count() as u16;
            frame.set_cursor_position((cursor_x, area.y));
        }
    }

    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let skip = self.log.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self.log[skip..]
            .iter()
            .map(|msg| {
                Line::from(Span::styled(
                    format!("  {}", msg),
                    Style::default().fg(Color::Rgb(150, 150, 170)),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 80)))
                .title(" Events ")
                .title_style(Style::default().fg(Color::Rgb(120, 120, 140))),
        );
        frame.render_widget(paragraph, area);
    }
}

/// Spaced-out mask; the gap between words comes out three columns wide.
pub fn render_mask(mask: &[char]) -> String {
    mask.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
