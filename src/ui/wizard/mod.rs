//! Wizard screen: one step at a time, fields bound to the record.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

pub mod steps;

use crate::ui::form_field::FormField;
use crate::wizard::{Wizard, WizardStep};
use steps::Binding;

/// What the app should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    None,
    /// Back to the dashboard; the draft stays on disk
    Exit,
    Save,
}

pub struct WizardScreen {
    wizard: Wizard,
    bindings: Vec<Binding>,
    fields: Vec<FormField>,
    focus: usize,
}

impl WizardScreen {
    pub fn new(wizard: Wizard) -> Self {
        let mut screen = Self {
            wizard,
            bindings: Vec::new(),
            fields: Vec::new(),
            focus: 0,
        };
        screen.load_step();
        screen
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Rebuild the widgets of the current step from the record
    fn load_step(&mut self) {
        self.bindings = steps::bindings(self.wizard.current_step());
        self.fields = self
            .bindings
            .iter()
            .map(|b| b.build(self.wizard.record()))
            .collect();
        self.focus = 0;
    }

    fn next_field(&mut self) {
        if self.focus + 1 < self.fields.len() {
            self.focus += 1;
        }
    }

    fn prev_field(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn next_step(&mut self) {
        if !self.wizard.is_last() {
            self.wizard.next();
            self.load_step();
        }
    }

    pub fn prev_step(&mut self) {
        if !self.wizard.is_first() {
            self.wizard.prev();
            self.load_step();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> WizardAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => {
                return if self.wizard.is_last() && !self.wizard.is_saving() {
                    WizardAction::Save
                } else {
                    WizardAction::None
                };
            }
            KeyCode::Esc => return WizardAction::Exit,
            KeyCode::PageDown => {
                self.next_step();
                return WizardAction::None;
            }
            KeyCode::PageUp => {
                self.prev_step();
                return WizardAction::None;
            }
            KeyCode::Tab => {
                self.next_field();
                return WizardAction::None;
            }
            KeyCode::BackTab => {
                self.prev_field();
                return WizardAction::None;
            }
            _ => {}
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return WizardAction::None;
        };

        if field.handle_key(key) {
            let patch = self.bindings[self.focus].write(self.wizard.record(), field);
            self.wizard.merge(patch, now);
        } else {
            match key.code {
                KeyCode::Down | KeyCode::Enter => self.next_field(),
                KeyCode::Up => self.prev_field(),
                _ => {}
            }
        }
        WizardAction::None
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let step = self.wizard.current_step();
        let panel = steps::panel(step, self.wizard.record(), self.focus);
        // Borders plus a little slack for wrapping
        let panel_height = u16::try_from(panel.len()).unwrap_or(u16::MAX).saturating_add(3);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),            // Step counter
                Constraint::Length(1),            // Progress
                Constraint::Length(1),            // Step tabs
                Constraint::Length(panel_height), // Guidance
                Constraint::Min(4),               // Fields
                Constraint::Length(1),            // Footer
            ])
            .split(area);

        let counter = Line::from(vec![
            Span::styled(
                format!(
                    "Etapa {} de {}  ",
                    self.wizard.step_index() + 1,
                    WizardStep::COUNT
                ),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                step.title(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            if self.wizard.was_restored() {
                Span::styled("  (rascunho restaurado)", Style::default().fg(Color::DarkGray))
            } else {
                Span::raw("")
            },
        ]);
        frame.render_widget(Paragraph::new(counter), chunks[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .percent(self.wizard.progress_percent());
        frame.render_widget(gauge, chunks[1]);

        let tabs: Vec<Span> = WizardStep::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, s)| {
                let style = if i == self.wizard.step_index() {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else if i < self.wizard.step_index() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                [Span::styled(s.title(), style), Span::raw(" › ")]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(tabs)), chunks[2]);

        let panel_widget = Paragraph::new(panel)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(panel_widget, chunks[3]);

        self.render_fields(frame, chunks[4]);

        let mut hints = vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" campo  "),
            Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)),
            Span::raw(" etapa  "),
        ];
        if self.wizard.is_last() {
            hints.push(Span::styled("Ctrl+S", Style::default().fg(Color::Yellow)));
            hints.push(Span::raw(if self.wizard.is_saving() {
                " salvando...  "
            } else {
                " salvar  "
            }));
        }
        hints.push(Span::styled("Esc", Style::default().fg(Color::Yellow)));
        hints.push(Span::raw(" voltar"));
        frame.render_widget(Paragraph::new(Line::from(hints)), chunks[5]);
    }

    /// Label plus widget per field, scrolled so the focused one is visible
    fn render_fields(&mut self, frame: &mut Frame, area: Rect) {
        let heights: Vec<u16> = self.fields.iter().map(|f| f.render_height() + 1).collect();
        let first = first_visible(&heights, self.focus, area.height);

        let mut y = area.y;
        for (i, field) in self.fields.iter_mut().enumerate().skip(first) {
            let height = heights[i];
            if y + height > area.y + area.height {
                break;
            }
            let focused = i == self.focus;

            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Yellow)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(self.bindings[i].label.as_str(), label_style)),
                Rect::new(area.x, y, area.width, 1),
            );
            field.render(
                frame,
                Rect::new(area.x + 2, y + 1, area.width.saturating_sub(2), height - 1),
                focused,
            );
            y += height;
        }
    }
}

/// First field to draw so that `focus` fits in `available` rows
fn first_visible(heights: &[u16], focus: usize, available: u16) -> usize {
    let mut used = 0u16;
    let mut first = focus.min(heights.len().saturating_sub(1));
    for i in (0..=first).rev() {
        let next = used.saturating_add(heights.get(i).copied().unwrap_or(0));
        if next > available {
            break;
        }
        used = next;
        first = i;
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DraftStore;
    use std::time::Duration;
    use tempfile::TempDir;

    fn screen(dir: &TempDir) -> WizardScreen {
        WizardScreen::new(Wizard::open(
            DraftStore::new(dir.path()),
            Duration::from_millis(1000),
        ))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_updates_record() {
        let dir = TempDir::new().unwrap();
        let mut screen = screen(&dir);
        let now = Instant::now();

        for c in "Dra. Ana".chars() {
            screen.handle_key(key(KeyCode::Char(c)), now);
        }
        assert_eq!(screen.wizard().record().meta.profissional.nome, "Dra. Ana");
    }

    #[test]
    fn test_sibling_fields_keep_their_values() {
        let dir = TempDir::new().unwrap();
        let mut screen = screen(&dir);
        let now = Instant::now();

        screen.handle_key(key(KeyCode::Char('A')), now);
        screen.handle_key(key(KeyCode::Tab), now);
        screen.handle_key(key(KeyCode::Char('1')), now);

        let prof = &screen.wizard().record().meta.profissional;
        assert_eq!(prof.nome, "A");
        assert_eq!(prof.registro, "1");
    }

    #[test]
    fn test_page_keys_move_between_steps() {
        let dir = TempDir::new().unwrap();
        let mut screen = screen(&dir);
        let now = Instant::now();

        screen.handle_key(key(KeyCode::PageUp), now);
        assert_eq!(screen.wizard().step_index(), 0);

        screen.handle_key(key(KeyCode::Tab), now);
        screen.handle_key(key(KeyCode::PageDown), now);
        assert_eq!(screen.wizard().current_step(), WizardStep::Identificacao);
        assert_eq!(screen.focus(), 0);
    }

    #[test]
    fn test_save_only_on_last_step() {
        let dir = TempDir::new().unwrap();
        let mut screen = screen(&dir);
        let now = Instant::now();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);

        assert_eq!(screen.handle_key(ctrl_s, now), WizardAction::None);
        for _ in 0..WizardStep::COUNT {
            screen.handle_key(key(KeyCode::PageDown), now);
        }
        assert_eq!(screen.handle_key(ctrl_s, now), WizardAction::Save);
    }

    #[test]
    fn test_esc_exits() {
        let dir = TempDir::new().unwrap();
        let mut screen = screen(&dir);
        assert_eq!(
            screen.handle_key(key(KeyCode::Esc), Instant::now()),
            WizardAction::Exit
        );
    }

    #[test]
    fn test_first_visible_keeps_focus_on_screen() {
        let heights = [2, 2, 5, 2, 2];
        assert_eq!(first_visible(&heights, 0, 6), 0);
        assert_eq!(first_visible(&heights, 2, 6), 2);
        assert_eq!(first_visible(&heights, 4, 6), 3);
        assert_eq!(first_visible(&heights, 4, 100), 0);
    }
}
