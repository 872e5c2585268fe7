use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use uuid::Uuid;

use gallows_common::game::GameSnapshot;
use gallows_common::player;

/// One line summing up how the round ended.
pub fn headline(game: &GameSnapshot) -> String {
    match game.player_name(game.winner_id) {
        Some(name) => format!("{} guessed it!", name),
        None => "Hanged! Nobody guessed the word.".to_string(),
    }
}

/// Who starts the next round, from the viewer's point of view.
pub fn next_round_prompt(game: &GameSnapshot, viewer: Option<Uuid>) -> String {
    match game.next_host_id {
        Some(id) if Some(id) == viewer => "You host the next round. Press [Enter] to start".into(),
        Some(_) => format!(
            "Waiting for {} to start the next round",
            game.player_name(game.next_host_id).unwrap_or("the next host")
        ),
        None => "Waiting for players".into(),
    }
}

/// The round-over panel: result, revealed word and the room podium.
pub fn draw_round_over(frame: &mut Frame, area: Rect, game: &GameSnapshot, viewer: Option<Uuid>) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Result
            Constraint::Length(3), // Word
            Constraint::Min(4),    // Podium
            Constraint::Length(2), // Next host
        ])
        .split(area);

    let won = game.winner_id.is_some();
    let result_color = if won {
        Color::Rgb(100, 255, 150)
    } else {
        Color::Rgb(255, 90, 90)
    };
    let result = Paragraph::new(Line::from(Span::styled(
        headline(game),
        Style::default()
            .fg(result_color)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(result, vertical[0]);

    let word = Paragraph::new(Line::from(vec![
        Span::styled("The word was ", Style::default().fg(Color::Rgb(180, 180, 200))),
        Span::styled(
            game.word.clone().unwrap_or_default(),
            Style::default()
                .fg(Color::Rgb(255, 220, 50))
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Rgb(60, 60, 80))),
    );
    frame.render_widget(word, vertical[1]);

    let podium_colors = [
        Color::Rgb(255, 220, 50),  // Gold
        Color::Rgb(180, 200, 220), // Silver
        Color::Rgb(210, 150, 100), // Bronze
    ];

    let rows: Vec<Row> = player::ranking(&game.players)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let color = podium_colors
                .get(i)
                .copied()
                .unwrap_or(Color::Rgb(120, 120, 140));
            let style = if i == 0 {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            Row::new(vec![
                Cell::from(format!("  #{}", i + 1)).style(style),
                Cell::from(p.name.clone()).style(style),
                Cell::from(p.wins.to_string()).style(style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(60),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(format!(" Standings after round {} ", game.round))
            .title_style(
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            ),
    );
    frame.render_widget(table, vertical[2]);

    let prompt = Paragraph::new(Span::styled(
        next_round_prompt(game, viewer),
        Style::default().fg(Color::Rgb(100, 200, 255)),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(prompt, vertical[3]);
}
