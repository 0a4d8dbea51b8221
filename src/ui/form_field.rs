//! Input widgets used by the wizard steps

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use crate::record::Vocabulary;

/// A single editable input
pub enum FormField {
    /// Single-line text
    Text {
        value: String,
        /// Cursor position in chars, not bytes
        cursor: usize,
        placeholder: String,
    },
    /// Digits only; `decimal` also accepts one `.` or `,`
    Number {
        value: String,
        cursor: usize,
        decimal: bool,
        placeholder: String,
    },
    /// Free text over several lines
    Multiline {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
    /// One of a closed set of options, cycled with Left/Right
    Select { options: Vec<String>, selected: usize },
    Toggle {
        value: bool,
        true_label: String,
        false_label: String,
    },
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

fn format_decimal(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        value.to_string()
    }
}

impl FormField {
    pub fn text(value: &str, placeholder: &str) -> Self {
        FormField::Text {
            cursor: value.chars().count(),
            value: value.to_string(),
            placeholder: placeholder.to_string(),
        }
    }

    /// Whole number input; zero shows as empty
    pub fn integer(value: i64, placeholder: &str) -> Self {
        let value = if value == 0 {
            String::new()
        } else {
            value.to_string()
        };
        FormField::Number {
            cursor: value.chars().count(),
            value,
            decimal: false,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn decimal(value: f64, placeholder: &str) -> Self {
        let value = format_decimal(value);
        FormField::Number {
            cursor: value.chars().count(),
            value,
            decimal: true,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn multiline(value: &str, placeholder: &str) -> Self {
        let lines: Vec<String> = if value.is_empty() {
            vec![String::new()]
        } else {
            value.lines().map(ToString::to_string).collect()
        };
        let mut textarea = TextArea::new(lines);
        textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        FormField::Multiline {
            textarea: Box::new(textarea),
            placeholder: placeholder.to_string(),
        }
    }

    pub fn select<V: Vocabulary>(current: V) -> Self {
        FormField::Select {
            options: V::labels(),
            selected: current.index(),
        }
    }

    pub fn toggle(value: bool, true_label: &str, false_label: &str) -> Self {
        FormField::Toggle {
            value,
            true_label: true_label.to_string(),
            false_label: false_label.to_string(),
        }
    }

    /// Current content as text (selected label for selects)
    pub fn value(&self) -> String {
        match self {
            FormField::Text { value, .. } | FormField::Number { value, .. } => value.clone(),
            FormField::Multiline { textarea, .. } => textarea.lines().join("\n"),
            FormField::Select { options, selected } => {
                options.get(*selected).cloned().unwrap_or_default()
            }
            FormField::Toggle { value, .. } => value.to_string(),
        }
    }

    /// Whole number; empty or unparseable input reads as zero
    pub fn as_i64(&self) -> i64 {
        self.value().trim().parse().unwrap_or(0)
    }

    /// Decimal number; empty, unparseable or overflowing input reads as zero
    pub fn as_f64(&self) -> f64 {
        self.value()
            .trim()
            .replace(',', ".")
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn selected<V: Vocabulary>(&self) -> V {
        match self {
            FormField::Select { selected, .. } => V::from_index(*selected),
            _ => V::from_index(0),
        }
    }

    pub fn checked(&self) -> bool {
        matches!(self, FormField::Toggle { value: true, .. })
    }

    /// Handle a key press; returns true if the field consumed it
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            FormField::Text { value, cursor, .. } => edit_line(value, cursor, key, |_| true),
            FormField::Number {
                value,
                cursor,
                decimal,
                ..
            } => {
                let decimal = *decimal;
                let has_separator = value.contains(['.', ',']);
                edit_line(value, cursor, key, |c| {
                    c.is_ascii_digit() || (decimal && !has_separator && (c == '.' || c == ','))
                })
            }
            FormField::Multiline { textarea, .. } => match key.code {
                // Focus movement belongs to the form
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => false,
                KeyCode::Up if textarea.cursor().0 == 0 => false,
                KeyCode::Down if textarea.cursor().0 + 1 >= textarea.lines().len() => false,
                _ => {
                    textarea.input(key);
                    true
                }
            },
            FormField::Select { options, selected } => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    *selected = selected.checked_sub(1).unwrap_or(options.len().saturating_sub(1));
                    true
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    *selected = if *selected + 1 >= options.len() {
                        0
                    } else {
                        *selected + 1
                    };
                    true
                }
                _ => false,
            },
            FormField::Toggle { value, .. } => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    *value = !*value;
                    true
                }
                KeyCode::Left | KeyCode::Char('s') => {
                    *value = true;
                    true
                }
                KeyCode::Right | KeyCode::Char('n') => {
                    *value = false;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn render_height(&self) -> u16 {
        match self {
            FormField::Multiline { .. } => 4,
            _ => 1,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let text_style = Style::default().fg(if focused { Color::White } else { Color::Gray });
        let placeholder_style = Style::default().fg(Color::DarkGray);

        match self {
            FormField::Text {
                value,
                cursor,
                placeholder,
            }
            | FormField::Number {
                value,
                cursor,
                placeholder,
                ..
            } => {
                let line = if value.is_empty() && !focused {
                    Line::from(Span::styled(placeholder.as_str(), placeholder_style))
                } else if focused {
                    let split = byte_index(value, *cursor);
                    Line::from(vec![
                        Span::raw(value[..split].to_string()),
                        Span::styled("|", Style::default().fg(Color::Cyan)),
                        Span::raw(value[split..].to_string()),
                    ])
                } else {
                    Line::from(value.as_str())
                };
                frame.render_widget(Paragraph::new(line).style(text_style), area);
            }
            FormField::Multiline {
                textarea,
                placeholder,
            } => {
                let border_color = if focused { Color::Cyan } else { Color::DarkGray };
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_block(
                    Block::default()
                        .borders(Borders::LEFT)
                        .border_style(Style::default().fg(border_color)),
                );
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(placeholder_style);
                frame.render_widget(&**textarea, area);
            }
            FormField::Select { options, selected } => {
                let mut spans = Vec::with_capacity(options.len() * 2);
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        spans.push(Span::raw("  "));
                    }
                    if i == *selected {
                        let style = if focused {
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                        } else {
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                        };
                        spans.push(Span::styled(format!(" {} ", option), style));
                    } else {
                        spans.push(Span::styled(option.clone(), placeholder_style));
                    }
                }
                frame.render_widget(Paragraph::new(Line::from(spans)), area);
            }
            FormField::Toggle {
                value,
                true_label,
                false_label,
            } => {
                let on = Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD);
                let off = Style::default().fg(Color::DarkGray);
                let line = Line::from(vec![
                    Span::styled(format!("[{}]", true_label), if *value { on } else { off }),
                    Span::raw(" / "),
                    Span::styled(
                        format!("[{}]", false_label),
                        if *value {
                            off
                        } else {
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                        },
                    ),
                ]);
                frame.render_widget(Paragraph::new(line), area);
            }
        }
    }
}

/// Line editing shared by text and number inputs
fn edit_line(
    value: &mut String,
    cursor: &mut usize,
    key: KeyEvent,
    accept: impl Fn(char) -> bool,
) -> bool {
    let len = value.chars().count();
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if accept(c) {
                value.insert(byte_index(value, *cursor), c);
                *cursor += 1;
            }
            true
        }
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                value.remove(byte_index(value, *cursor));
            }
            true
        }
        KeyCode::Delete => {
            if *cursor < len {
                value.remove(byte_index(value, *cursor));
            }
            true
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
            true
        }
        KeyCode::Right => {
            if *cursor < len {
                *cursor += 1;
            }
            true
        }
        KeyCode::Home => {
            *cursor = 0;
            true
        }
        KeyCode::End => {
            *cursor = len;
            true
        }
        _ => false,
    }
}
