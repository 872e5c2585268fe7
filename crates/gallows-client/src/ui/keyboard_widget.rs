use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use gallows_common::game::{GameSnapshot, KeyState};

const ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

fn key_style(state: KeyState, enabled: bool) -> Style {
    match state {
        KeyState::Hit => Style::default()
            .fg(Color::Rgb(20, 20, 30))
            .bg(Color::Rgb(100, 220, 130))
            .add_modifier(Modifier::BOLD),
        KeyState::Miss => Style::default()
            .fg(Color::Rgb(90, 90, 100))
            .bg(Color::Rgb(70, 30, 30))
            .add_modifier(Modifier::CROSSED_OUT),
        KeyState::Unused if enabled => Style::default()
            .fg(Color::White)
            .bg(Color::Rgb(50, 50, 70))
            .add_modifier(Modifier::BOLD),
        KeyState::Unused => Style::default()
            .fg(Color::Rgb(140, 140, 160))
            .bg(Color::Rgb(35, 35, 45)),
    }
}

/// QWERTY keyboard colored by what each letter did this round. `enabled`
/// brightens untried keys when the viewer may guess.
pub fn render_keyboard(game: &GameSnapshot, enabled: bool) -> Vec<Line<'static>> {
    ROWS.iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut spans = vec![Span::raw(" ".repeat(row_idx * 2 + 1))];
            for (i, letter) in row.chars().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled(
                    format!(" {} ", letter),
                    key_style(game.key_state(letter), enabled),
                ));
            }
            Line::from(spans)
        })
        .collect()
}
