use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Screen;
use crate::ui::game::InputMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ShowHelp,
    CloseHelp,

    // Text input
    TypeChar(char),
    Backspace,
    Submit,
    SwitchField,

    // Navigation
    NavigateUp,
    NavigateDown,

    // Lobby
    RefreshRooms,
    CreateRoom,
    CreateTvRoom,
    JoinSelected,
    WatchSelected,
    StartGame,
    LeaveRoom,

    // Round
    SuggestWord,
    GuessLetter(char),
    OpenFullGuess,
    CancelFullGuess,
    NextRound,
}

pub fn map_key(key: KeyEvent, screen: &Screen, help_open: bool) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C always quits
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if help_open {
        return Some(Action::CloseHelp);
    }

    match screen {
        Screen::Connect(_) => match key.code {
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab => Some(Action::SwitchField),
            KeyCode::Char(c) => Some(Action::TypeChar(c)),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },

        Screen::Lobby(_) => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::RefreshRooms),
            KeyCode::Char('c') => Some(Action::CreateRoom),
            KeyCode::Char('t') => Some(Action::CreateTvRoom),
            KeyCode::Char('w') => Some(Action::WatchSelected),
            KeyCode::Enter => Some(Action::JoinSelected),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::NavigateUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::NavigateDown),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Esc => Some(Action::Quit),
            _ => None,
        },

        Screen::Game(g) => match g.input_mode() {
            InputMode::Watching | InputMode::Waiting => match key.code {
                KeyCode::Esc => Some(Action::LeaveRoom),
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                _ => None,
            },

            InputMode::Lobby => match key.code {
                KeyCode::Enter => Some(Action::StartGame),
                KeyCode::Esc => Some(Action::LeaveRoom),
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                _ => None,
            },

            InputMode::Setup => match key.code {
                KeyCode::Char('r') if ctrl => Some(Action::SuggestWord),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchField),
                KeyCode::Char(c) => Some(Action::TypeChar(c)),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Esc => Some(Action::LeaveRoom),
                _ => None,
            },

            InputMode::Guessing => match key.code {
                KeyCode::Char('!') | KeyCode::Enter => Some(Action::OpenFullGuess),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                KeyCode::Char(c) if c.is_alphabetic() => Some(Action::GuessLetter(c)),
                KeyCode::Esc => Some(Action::LeaveRoom),
                _ => None,
            },

            InputMode::FullGuess => match key.code {
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Esc => Some(Action::CancelFullGuess),
                KeyCode::Char(c) => Some(Action::TypeChar(c)),
                KeyCode::Backspace => Some(Action::Backspace),
                _ => None,
            },

            InputMode::Finished => match key.code {
                KeyCode::Enter => Some(Action::NextRound),
                KeyCode::Esc => Some(Action::LeaveRoom),
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ShowHelp),
                _ => None,
            },
        },
    }
}
