//! Sign-in screen: shows the provider URL, accepts the pasted redirect.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::dialogs::centered_rect;
use super::form_field::FormField;
use crate::auth::session_id_from_location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    None,
    Quit,
    /// Pasted location carrying a `session_id` fragment
    Submit(String),
}

pub struct LoginScreen {
    login_url: String,
    callback: FormField,
    error: Option<String>,
}

impl LoginScreen {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            callback: FormField::text("", "Cole aqui a URL de retorno"),
            error: None,
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LoginAction {
        match key.code {
            KeyCode::Esc => LoginAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                LoginAction::Quit
            }
            KeyCode::Enter => {
                let location = self.callback.value().trim().to_string();
                if session_id_from_location(&location).is_some() {
                    self.error = None;
                    LoginAction::Submit(location)
                } else {
                    self.error = Some("URL sem session_id. Copie a URL completa.".to_string());
                    LoginAction::None
                }
            }
            _ => {
                self.callback.handle_key(key);
                LoginAction::None
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "Anamnese",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" · Entrar "),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(4), // Instructions
                Constraint::Length(3), // URL
                Constraint::Length(3), // Input
                Constraint::Min(1),    // Error
                Constraint::Length(1), // Footer
            ])
            .split(inner);

        let intro = Paragraph::new(vec![
            Line::from("Abra o endereço abaixo no navegador e faça login."),
            Line::from("Depois, copie a URL para a qual você foi redirecionado"),
            Line::from("e cole no campo abaixo."),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(intro, chunks[0]);

        frame.render_widget(
            Paragraph::new(Span::styled(
                self.login_url.as_str(),
                Style::default().fg(Color::Green),
            ))
            .wrap(Wrap { trim: false }),
            chunks[1],
        );

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let input_area = input_block.inner(chunks[2]);
        frame.render_widget(input_block, chunks[2]);
        self.callback.render(frame, input_area, true);

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
                chunks[3],
            );
        }

        let footer = Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" confirmar  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" sair"),
        ]);
        frame.render_widget(
            Paragraph::new(footer).alignment(Alignment::Center),
            chunks[4],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_submit_requires_session_fragment() {
        let mut screen = LoginScreen::new("https://auth.example/?redirect=x");
        type_text(&mut screen, "http://localhost:3000/");
        assert_eq!(
            screen.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            LoginAction::None
        );
        assert!(screen.error.is_some());
    }

    #[test]
    fn test_submit_pasted_callback() {
        let mut screen = LoginScreen::new("https://auth.example/?redirect=x");
        type_text(&mut screen, "http://localhost:3000/#session_id=abc");
        assert_eq!(
            screen.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            LoginAction::Submit("http://localhost:3000/#session_id=abc".to_string())
        );
    }
}
