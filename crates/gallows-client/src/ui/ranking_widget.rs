use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};
use uuid::Uuid;

use gallows_common::game::GameSnapshot;
use gallows_common::player;

/// Player colors - each player keeps the color of their seat
const PLAYER_COLORS: [Color; 6] = [
    Color::Rgb(100, 200, 255), // Sky blue
    Color::Rgb(255, 150, 100), // Coral
    Color::Rgb(150, 255, 150), // Lime
    Color::Rgb(255, 200, 100), // Gold
    Color::Rgb(200, 150, 255), // Lavender
    Color::Rgb(255, 150, 200), // Pink
];

pub fn player_color(seat: usize) -> Color {
    PLAYER_COLORS[seat % PLAYER_COLORS.len()]
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}

/// Players ranked by room wins. The host is tagged, the guesser on turn is
/// marked with an arrow and the viewer's own row is underlined.
pub fn build_ranking_table<'a>(game: &GameSnapshot, viewer: Option<Uuid>) -> Table<'a> {
    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Player").style(Style::default().fg(Color::Rgb(180, 180, 200))),
        Cell::from("Wins").style(Style::default().fg(Color::Rgb(180, 180, 200))),
        Cell::from("All-time").style(Style::default().fg(Color::Rgb(180, 180, 200))),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD))
    .bottom_margin(1);

    let rows: Vec<Row> = player::ranking(&game.players)
        .into_iter()
        .map(|p| {
            let seat = game
                .players
                .iter()
                .position(|q| q.id == p.id)
                .unwrap_or(0);
            let marker = if game.is_turn(p.id) {
                ">"
            } else if game.guesser_id == Some(p.id) {
                "!"
            } else {
                " "
            };
            let mut name_style = Style::default().fg(player_color(seat));
            if Some(p.id) == viewer {
                name_style = name_style.add_modifier(Modifier::UNDERLINED);
            }
            if game.is_turn(p.id) {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            let name = if game.is_host(p.id) {
                format!("{} (host)", truncate_name(&p.name, 10))
            } else {
                truncate_name(&p.name, 12)
            };
            let wins_style = if game.winner_id == Some(p.id) {
                Style::default()
                    .fg(Color::Rgb(100, 255, 100))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Rgb(200, 200, 220))
            };
            Row::new(vec![
                Cell::from(marker).style(
                    Style::default()
                        .fg(Color::Rgb(100, 255, 150))
                        .add_modifier(Modifier::BOLD),
                ),
                Cell::from(name).style(name_style),
                Cell::from(p.wins.to_string()).style(wins_style),
                Cell::from(p.global_wins.to_string())
                    .style(Style::default().fg(Color::Rgb(150, 150, 170))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(12),
        Constraint::Length(5),
        Constraint::Length(9),
    ];

    Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(" Ranking ")
            .title_style(Style::default().fg(Color::Rgb(180, 180, 200))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Ana", 8), "Ana");
        assert_eq!(truncate_name("Bartholomew", 8), "Barthol~");
    }

    #[test]
    fn test_player_color_wraps() {
        assert_eq!(player_color(0), player_color(PLAYER_COLORS.len()));
    }
}
