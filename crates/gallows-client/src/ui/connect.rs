use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone)]
pub struct ConnectScreen {
    pub host: String,
    pub name: String,
    /// Optional room code to join (or watch, in TV mode) right after
    /// connecting.
    pub room: String,
    pub tv: bool,
    pub active_field: ConnectField,
    pub error_message: Option<String>,
    pub connecting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectField {
    Name,
    Host,
    Room,
}

impl ConnectScreen {
    pub fn new(host: String, name: String, room: String, tv: bool) -> Self {
        Self {
            host,
            name,
            room,
            tv,
            active_field: ConnectField::Name,
            error_message: None,
            connecting: false,
        }
    }

    pub fn switch_field(&mut self) {
        self.active_field = match self.active_field {
            ConnectField::Name => ConnectField::Host,
            ConnectField::Host => ConnectField::Room,
            ConnectField::Room => ConnectField::Name,
        };
    }

    pub fn type_char(&mut self, c: char) {
        match self.active_field {
            ConnectField::Host => self.host.push(c),
            ConnectField::Name => self.name.push(c),
            ConnectField::Room => {
                if self.room.len() < gallows_common::lobby::CODE_LEN {
                    self.room.push(c.to_ascii_uppercase());
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            ConnectField::Host => {
                self.host.pop();
            }
            ConnectField::Name => {
                self.name.pop();
            }
            ConnectField::Room => {
                self.room.pop();
            }
        }
    }

    fn field_style(&self, field: ConnectField) -> Style {
        if self.active_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center the form
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Length(18),
                Constraint::Percentage(20),
            ])
            .split(area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(50),
                Constraint::Percentage(25),
            ])
            .split(vertical[1]);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Title
                Constraint::Length(3), // Name field
                Constraint::Length(3), // Host field
                Constraint::Length(3), // Room code field
                Constraint::Length(2), // Status/Error
                Constraint::Length(2), // Help
            ])
            .split(horizontal[1]);

        let subtitle = if self.tv {
            " - Hangman party (TV display)"
        } else {
            " - Hangman party"
        };
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "  GALLOWS",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(subtitle),
        ]));
        frame.render_widget(title, chunks[0]);

        let fields = [
            (ConnectField::Name, self.name.as_str(), " Player Name ", chunks[1]),
            (ConnectField::Host, self.host.as_str(), " Server Address ", chunks[2]),
            (
                ConnectField::Room,
                self.room.as_str(),
                " Room Code (optional) ",
                chunks[3],
            ),
        ];
        for (field, value, label, rect) in fields {
            let input = Paragraph::new(value).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.field_style(field))
                    .title(label),
            );
            frame.render_widget(input, rect);
        }

        // Status/Error
        if self.connecting {
            let status = Paragraph::new("  Connecting...").style(Style::default().fg(Color::Cyan));
            frame.render_widget(status, chunks[4]);
        } else if let Some(ref err) = self.error_message {
            let error =
                Paragraph::new(format!("  {}", err)).style(Style::default().fg(Color::Red));
            frame.render_widget(error, chunks[4]);
        }

        let help = Paragraph::new("  [Tab] Switch field  [Enter] Connect  [Esc] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[5]);

        if !self.connecting {
            let (rect, len) = match self.active_field {
                ConnectField::Name => (chunks[1], self.name.chars().count()),
                ConnectField::Host => (chunks[2], self.host.chars().count()),
                ConnectField::Room => (chunks[3], self.room.chars().count()),
            };
            frame.set_cursor_position((rect.x + len as u16 + 1, rect.y + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_cycle_and_edit() {
        let mut s = ConnectScreen::new("127.0.0.1:9876".into(), String::new(), String::new(), false);
        s.type_char('A');
        s.switch_field();
        s.backspace();
        assert_eq!(s.host, "127.0.0.1:987");
        s.switch_field();
        for c in "abcde".chars() {
            s.type_char(c);
        }
        assert_eq!(s.room, "ABCD");
        s.switch_field();
        assert_eq!(s.active_field, ConnectField::Name);
        assert_eq!(s.name, "A");
    }
}
