use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use gallows_common::game::MAX_MISTAKES;

// Body parts in drawing order: (row, column, glyph).
const PARTS: [&[(usize, usize, char)]; MAX_MISTAKES as usize] = [
    &[(2, 2, 'O')],              // head
    &[(3, 2, '|'), (4, 2, '|')], // body
    &[(3, 1, '/')],              // left arm
    &[(3, 3, '\\')],             // right arm
    &[(5, 1, '/')],              // left leg
    &[(5, 3, '\\')],             // right leg
];

const FRAME: [&str; 7] = [
    "  +---+ ",
    "  |   | ",
    "      | ",
    "      | ",
    "      | ",
    "      | ",
    "========",
];

/// The gallows with one body part per mistake.
pub fn render_gallows(mistakes: u8, lost: bool) -> Vec<Line<'static>> {
    let frame_style = Style::default().fg(Color::Rgb(180, 140, 90));
    let body_style = if lost {
        Style::default()
            .fg(Color::Rgb(255, 90, 90))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(230, 230, 240))
            .add_modifier(Modifier::BOLD)
    };

    let mut grid: Vec<Vec<Span<'static>>> = FRAME
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| match c {
                    ' ' => Span::raw(" "),
                    _ => Span::styled(c.to_string(), frame_style),
                })
                .collect()
        })
        .collect();

    for part in PARTS.iter().take(mistakes as usize) {
        for &(row, col, glyph) in part.iter() {
            if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = Span::styled(glyph.to_string(), body_style);
            }
        }
    }

    grid.into_iter().map(Line::from).collect()
}

/// Mistake counter shown under the gallows.
pub fn mistakes_line(mistakes: u8) -> Line<'static> {
    let left = MAX_MISTAKES.saturating_sub(mistakes);
    let color = match left {
        0 => Color::Rgb(255, 90, 90),
        1 | 2 => Color::Rgb(255, 180, 50),
        _ => Color::Rgb(150, 150, 170),
    };
    Line::from(vec![
        Span::styled(
            format!("{}/{} mistakes", mistakes, MAX_MISTAKES),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({} left)", left),
            Style::default().fg(Color::Rgb(120, 120, 140)),
        ),
    ])
}
