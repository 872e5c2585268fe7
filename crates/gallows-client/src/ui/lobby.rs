use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use uuid::Uuid;

use gallows_common::game::{Phase, RoomVariant};
use gallows_common::lobby::{LeaderboardEntry, RoomCode, RoomInfo};

#[derive(Debug, Clone)]
pub struct LobbyScreen {
    pub rooms: Vec<RoomInfo>,
    /// Server-wide ranking, best first.
    pub leaderboard: Vec<LeaderboardEntry>,
    pub table_state: TableState,
    pub player_name: String,
    pub player_id: Option<Uuid>,
    pub status_message: Option<String>,
}

impl LobbyScreen {
    pub fn new(player_name: String) -> Self {
        Self {
            rooms: Vec::new(),
            leaderboard: Vec::new(),
            table_state: TableState::default(),
            player_name,
            player_id: None,
            status_message: None,
        }
    }

    pub fn set_rooms(&mut self, rooms: Vec<RoomInfo>) {
        self.rooms = rooms;
        match self.table_state.selected() {
            _ if self.rooms.is_empty() => self.table_state.select(None),
            Some(i) if i >= self.rooms.len() => self.table_state.select(Some(self.rooms.len() - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn select_next(&mut self) {
        if self.rooms.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1) % self.rooms.len(),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        if self.rooms.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) => self.rooms.len() - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_room(&self) -> Option<&RoomCode> {
        self.table_state
            .selected()
            .and_then(|i| self.rooms.get(i))
            .map(|r| &r.code)
    }

    /// Ranking lines for the side panel. The viewer's own row stands out.
    pub fn leaderboard_lines(&self) -> Vec<Line<'static>> {
        if self.leaderboard.is_empty() {
            return vec![Line::from(Span::styled(
                "  No wins yet",
                Style::default().fg(Color::Rgb(120, 120, 140)),
            ))];
        }
        self.leaderboard
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let me = Some(entry.player_id) == self.player_id;
                let name_style = if me {
                    Style::default()
                        .fg(Color::Rgb(100, 200, 255))
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Rgb(200, 200, 220))
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:>3}. ", i + 1),
                        Style::default().fg(Color::Rgb(120, 120, 140)),
                    ),
                    Span::styled(entry.name.clone(), name_style),
                    Span::styled(
                        format!("  {}", entry.wins),
                        Style::default().fg(Color::Rgb(255, 220, 50)),
                    ),
                ])
            })
            .collect()
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(5),    // Room list
                Constraint::Length(3), // Help bar
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "  GALLOWS ",
                Style::default()
                    .fg(Color::Rgb(255, 220, 50))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("Lobby - Welcome, ", Style::default().fg(Color::Rgb(180, 180, 200))),
            Span::styled(
                &self.player_name,
                Style::default()
                    .fg(Color::Rgb(100, 200, 255))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("!", Style::default().fg(Color::Rgb(180, 180, 200))),
        ]))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 80))),
        );
        frame.render_widget(title, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        let ranking = Paragraph::new(self.leaderboard_lines()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
                .title(" Top players ")
                .title_style(Style::default().fg(Color::Rgb(255, 220, 50))),
        );
        frame.render_widget(ranking, body[1]);

        let rooms_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(" Rooms ")
            .title_style(Style::default().fg(Color::Rgb(180, 180, 200)));

        if self.rooms.is_empty() {
            let empty = Paragraph::new(Line::from(vec![
                Span::styled("  No rooms open. Press ", Style::default().fg(Color::Rgb(120, 120, 140))),
                Span::styled("[C]", Style::default().fg(Color::Rgb(100, 200, 255))),
                Span::styled(" to create one.", Style::default().fg(Color::Rgb(120, 120, 140))),
            ]))
            .block(rooms_block);
            frame.render_widget(empty, body[0]);
        } else {
            let header = Row::new(vec![
                Cell::from("Code").style(Style::default().fg(Color::Rgb(180, 180, 200))),
                Cell::from("Kind").style(Style::default().fg(Color::Rgb(180, 180, 200))),
                Cell::from("Players").style(Style::default().fg(Color::Rgb(180, 180, 200))),
                Cell::from("Round").style(Style::default().fg(Color::Rgb(180, 180, 200))),
                Cell::from("Status").style(Style::default().fg(Color::Rgb(180, 180, 200))),
            ])
            .style(Style::default().add_modifier(Modifier::BOLD));

            let rows: Vec<Row> = self
                .rooms
                .iter()
                .map(|room| {
                    let (status, status_color) = match room.phase {
                        Phase::Lobby => ("Waiting", Color::Rgb(100, 255, 150)),
                        Phase::Setup => ("Choosing word", Color::Rgb(255, 200, 100)),
                        Phase::Playing => ("Guessing", Color::Rgb(100, 200, 255)),
                        Phase::Finished => ("Round over", Color::Rgb(150, 150, 170)),
                    };
                    let kind = match room.variant {
                        RoomVariant::Tv => "TV",
                        RoomVariant::Peer => "Party",
                    };
                    Row::new(vec![
                        Cell::from(room.code.to_string()).style(
                            Style::default()
                                .fg(Color::Rgb(200, 200, 220))
                                .add_modifier(Modifier::BOLD),
                        ),
                        Cell::from(kind).style(Style::default().fg(Color::Rgb(150, 150, 170))),
                        Cell::from(room.player_count.to_string())
                            .style(Style::default().fg(Color::Rgb(150, 150, 170))),
                        Cell::from(room.round.to_string())
                            .style(Style::default().fg(Color::Rgb(150, 150, 170))),
                        Cell::from(status).style(Style::default().fg(status_color)),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Percentage(15),
                Constraint::Percentage(15),
                Constraint::Percentage(20),
                Constraint::Percentage(15),
                Constraint::Percentage(35),
            ];

            let table = Table::new(rows, widths)
                .header(header)
                .block(rooms_block)
                .row_highlight_style(
                    Style::default()
                        .bg(Color::Rgb(40, 40, 60))
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(" > ");

            let mut table_state = self.table_state.clone();
            frame.render_stateful_widget(table, body[0], &mut table_state);
        }

        let mut help_spans = vec![Span::raw("  ")];
        if let Some(ref msg) = self.status_message {
            help_spans.push(Span::styled(
                format!("{} | ", msg),
                Style::default().fg(Color::Rgb(100, 255, 150)),
            ));
        }
        help_spans.extend_from_slice(&[
            Span::styled("[C]", Style::default().fg(Color::Rgb(100, 200, 255))),
            Span::styled(" Create  ", Style::default().fg(Color::Rgb(120, 120, 140))),
            Span::styled("[T]", Style::default().fg(Color::Rgb(100, 200, 255))),
            Span::styled(" Create TV room  ", Style::default().fg(Color::Rgb(120, 120, 140))),
            Span::styled("[Enter]", Style::default().fg(Color::Rgb(100, 255, 150))),
            Span::styled(" Join  ", Style::default().fg(Color::Rgb(120, 120, 140))),
            Span::styled("[W]", Style::default().fg(Color::Rgb(200, 150, 255))),
            Span::styled(" Watch  ", Style::default().fg(Color::Rgb(120, 120, 140))),
            Span::styled("[R]", Style::default().fg(Color::Rgb(255, 200, 100))),
            Span::styled(" Refresh  ", Style::default().fg(Color::Rgb(120, 120, 140))),
            Span::styled("[Q]", Style::default().fg(Color::Rgb(255, 150, 100))),
            Span::styled(" Quit", Style::default().fg(Color::Rgb(120, 120, 140))),
        ]);
        let help = Paragraph::new(Line::from(help_spans)).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 80))),
        );
        frame.render_widget(help, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(code: &str) -> RoomInfo {
        RoomInfo {
            code: RoomCode::parse(code).unwrap(),
            variant: RoomVariant::Peer,
            player_count: 2,
            display_count: 0,
            phase: Phase::Lobby,
            round: 0,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_selection_wraps_and_survives_refresh() {
        let mut lobby = LobbyScreen::new("Ana".into());
        lobby.set_rooms(vec![info("AAAA"), info("BBBB"), info("CCCC")]);
        assert_eq!(lobby.selected_room().map(|c| c.as_str()), Some("AAAA"));

        lobby.select_prev();
        assert_eq!(lobby.selected_room().map(|c| c.as_str()), Some("CCCC"));

        lobby.set_rooms(vec![info("AAAA")]);
        assert_eq!(lobby.selected_room().map(|c| c.as_str()), Some("AAAA"));

        lobby.set_rooms(Vec::new());
        assert_eq!(lobby.selected_room(), None);
    }

    #[test]
    fn test_leaderboard_panel_ranks_and_marks_viewer() {
        let me = Uuid::new_v4();
        let mut lobby = LobbyScreen::new("Ana".into());
        assert_eq!(lobby.leaderboard_lines().len(), 1);

        lobby.player_id = Some(me);
        lobby.leaderboard = vec![
            LeaderboardEntry {
                player_id: Uuid::new_v4(),
                name: "Bruno".into(),
                wins: 7,
            },
            LeaderboardEntry {
                player_id: me,
                name: "Ana".into(),
                wins: 3,
            },
        ];
        let lines = lobby.leaderboard_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content, "  1. ");
        assert_eq!(lines[1].spans[1].content, "Ana");
        assert!(lines[1].spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));
    }
}
