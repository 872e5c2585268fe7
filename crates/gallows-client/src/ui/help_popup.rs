use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use gallows_common::game::MAX_MISTAKES;

pub fn draw_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let mistakes = format!("{} wrong letters and everyone is hanged", MAX_MISTAKES);
    let sections: Vec<(&str, Color, Vec<(&str, &str)>)> = vec![
        ("HOW A ROUND WORKS", Color::Rgb(255, 220, 50), vec![]),
        (
            "Host",
            Color::Rgb(100, 200, 255),
            vec![
                ("Secret word", "The host types a word and a hint"),
                ("Watching", "The host never guesses their own word"),
                ("Next round", "Hosting rotates so everyone gets a turn"),
            ],
        ),
        (
            "Guessers",
            Color::Rgb(200, 150, 255),
            vec![
                ("Letters", "Take turns guessing one letter at a time"),
                ("Hit", "Every copy of the letter is revealed"),
                ("Miss", "One more body part on the gallows"),
                ("Mistakes", mistakes.as_str()),
                ("Full word", "Anyone may try; only one at a time"),
                ("Wrong word", "Costs a win; your turn passes if you had it"),
            ],
        ),
        (
            "CONTROLS",
            Color::Rgb(100, 255, 150),
            vec![
                ("[A]-[Z]", "Guess a letter on your turn"),
                ("[!]/[Enter]", "Guess the whole word"),
                ("[Esc]", "Cancel a word guess / leave the room"),
                ("[Ctrl+R]", "Suggest a word while choosing"),
                ("[Tab]", "Switch between word and hint"),
                ("[?]", "Toggle this help screen"),
                ("[Q]", "Quit"),
            ],
        ),
    ];

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for (title, color, items) in &sections {
        lines.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for (key, desc) in items {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("    {:<16}", key),
                    Style::default().fg(Color::Rgb(200, 200, 220)),
                ),
                Span::styled(
                    desc.to_string(),
                    Style::default().fg(Color::Rgb(150, 150, 170)),
                ),
            ]));
        }
        if !items.is_empty() {
            lines.push(Line::from(""));
        }
    }

    lines.push(Line::from(Span::styled(
        "  Press any key to close",
        Style::default().fg(Color::Rgb(100, 100, 120)),
    )));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 200, 255)))
            .title(" Help - Hangman Rules & Controls ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            ),
    );

    frame.render_widget(paragraph, popup_area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(70, 80, parent);
        assert!(popup.x >= parent.x && popup.right() <= parent.right());
        assert!(popup.y >= parent.y && popup.bottom() <= parent.bottom());
        assert_eq!(popup.width, 70);
        assert_eq!(popup.height, 40);
    }
}
