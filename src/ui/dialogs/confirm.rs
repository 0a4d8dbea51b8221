use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Still waiting for an answer
    Pending,
    Confirmed,
    Cancelled,
}

/// Yes/no question over the current screen
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    pub visible: bool,
    title: String,
    message: String,
    /// `true` = Sim; defaults to Não so Enter is the safe answer
    yes_selected: bool,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.title = title.into();
        self.message = message.into();
        self.yes_selected = false;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn handle_key(&mut self, key: KeyCode) -> ConfirmOutcome {
        let outcome = match key {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h' | 'l') => {
                self.yes_selected = !self.yes_selected;
                ConfirmOutcome::Pending
            }
            KeyCode::Char('s' | 'S' | 'y' | 'Y') => ConfirmOutcome::Confirmed,
            KeyCode::Char('n' | 'N') | KeyCode::Esc => ConfirmOutcome::Cancelled,
            KeyCode::Enter if self.yes_selected => ConfirmOutcome::Confirmed,
            KeyCode::Enter => ConfirmOutcome::Cancelled,
            _ => ConfirmOutcome::Pending,
        };
        if outcome != ConfirmOutcome::Pending {
            self.hide();
        }
        outcome
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(2), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center),
            chunks[0],
        );

        let selected = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let idle = Style::default().fg(Color::Gray);
        let buttons = Line::from(vec![
            Span::styled(" Sim ", if self.yes_selected { selected } else { idle }),
            Span::raw("    "),
            Span::styled(" Não ", if self.yes_selected { idle } else { selected }),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_defaults_to_cancel() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("Excluir", "Excluir anamnese?");
        assert_eq!(dialog.handle_key(KeyCode::Enter), ConfirmOutcome::Cancelled);
        assert!(!dialog.visible);
    }

    #[test]
    fn test_toggle_then_enter_confirms() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("Excluir", "Excluir anamnese?");
        assert_eq!(dialog.handle_key(KeyCode::Left), ConfirmOutcome::Pending);
        assert!(dialog.visible);
        assert_eq!(dialog.handle_key(KeyCode::Enter), ConfirmOutcome::Confirmed);
    }

    #[test]
    fn test_shortcut_keys() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("t", "m");
        assert_eq!(dialog.handle_key(KeyCode::Char('s')), ConfirmOutcome::Confirmed);
        dialog.show("t", "m");
        assert_eq!(dialog.handle_key(KeyCode::Esc), ConfirmOutcome::Cancelled);
    }
}
