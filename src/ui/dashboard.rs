//! Record list with search, as summary cards.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::dialogs::{ConfirmDialog, ConfirmOutcome};
use super::form_field::FormField;
use crate::api::User;
use crate::record::{Anamnese, Vocabulary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    None,
    Quit,
    NewRecord,
    Open(String),
    /// Refetch with the given term; `None` lists everything
    Search(Option<String>),
    Delete(String),
    Logout,
}

pub struct Dashboard {
    records: Vec<Anamnese>,
    state: ListState,
    search: FormField,
    searching: bool,
    loading: bool,
    confirm: ConfirmDialog,
    pending_delete: Option<String>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: ListState::default(),
            search: FormField::text("", "Buscar por nome ou queixa"),
            searching: false,
            loading: false,
            confirm: ConfirmDialog::new(),
            pending_delete: None,
        }
    }

    pub fn records(&self) -> &[Anamnese] {
        &self.records
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replace the list after a fetch, keeping the selection in range
    pub fn set_records(&mut self, records: Vec<Anamnese>) {
        self.records = records;
        self.loading = false;
        let selected = match self.state.selected() {
            _ if self.records.is_empty() => None,
            Some(i) => Some(i.min(self.records.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    /// Current search term, `None` when blank
    pub fn search_term(&self) -> Option<String> {
        let value = self.search.value();
        let term = value.trim();
        (!term.is_empty()).then(|| term.to_string())
    }

    fn selected(&self) -> Option<&Anamnese> {
        self.state.selected().and_then(|i| self.records.get(i))
    }

    fn select_next(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1) % self.records.len());
        self.state.select(Some(i));
    }

    fn select_prev(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.records.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DashboardAction {
        if self.confirm.visible {
            return match self.confirm.handle_key(key.code) {
                ConfirmOutcome::Confirmed => self
                    .pending_delete
                    .take()
                    .map_or(DashboardAction::None, DashboardAction::Delete),
                ConfirmOutcome::Cancelled => {
                    self.pending_delete = None;
                    DashboardAction::None
                }
                ConfirmOutcome::Pending => DashboardAction::None,
            };
        }

        if self.searching {
            return match key.code {
                KeyCode::Enter => {
                    self.searching = false;
                    DashboardAction::Search(self.search_term())
                }
                KeyCode::Esc => {
                    self.searching = false;
                    DashboardAction::None
                }
                _ => {
                    self.search.handle_key(key);
                    DashboardAction::None
                }
            };
        }

        match key.code {
            KeyCode::Char('q') => DashboardAction::Quit,
            KeyCode::Char('n') => DashboardAction::NewRecord,
            KeyCode::Char('/') => {
                self.searching = true;
                DashboardAction::None
            }
            KeyCode::Char('r') => DashboardAction::Search(self.search_term()),
            KeyCode::Char('L') => DashboardAction::Logout,
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                DashboardAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                DashboardAction::None
            }
            KeyCode::Enter => self
                .selected()
                .map_or(DashboardAction::None, |a| DashboardAction::Open(a.id.clone())),
            KeyCode::Char('d') => {
                let target = self.selected().map(|record| {
                    let message = format!(
                        "Excluir a anamnese de {}? Esta ação não pode ser desfeita.",
                        display_name(record.patient_name())
                    );
                    (record.id.clone(), message)
                });
                if let Some((id, message)) = target {
                    self.pending_delete = Some(id);
                    self.confirm.show("Excluir anamnese", message);
                }
                DashboardAction::None
            }
            _ => DashboardAction::None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, user: Option<&User>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(3), // Search
                Constraint::Min(3),    // Cards
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let mut header = vec![Span::styled(
            "Anamneses",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(user) = user {
            header.push(Span::styled(
                format!("  {} <{}>", user.name, user.email),
                Style::default().fg(Color::Gray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

        let search_block = Block::default()
            .title(" Busca ")
            .borders(Borders::ALL)
            .border_style(if self.searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        let search_area = search_block.inner(chunks[1]);
        frame.render_widget(search_block, chunks[1]);
        self.search.render(frame, search_area, self.searching);

        self.render_cards(frame, chunks[2]);

        let key = Style::default().fg(Color::Yellow);
        let footer = Line::from(vec![
            Span::styled("n", key),
            Span::raw(" nova  "),
            Span::styled("Enter", key),
            Span::raw(" abrir  "),
            Span::styled("/", key),
            Span::raw(" buscar  "),
            Span::styled("d", key),
            Span::raw(" excluir  "),
            Span::styled("L", key),
            Span::raw(" sair da conta  "),
            Span::styled("q", key),
            Span::raw(" fechar"),
        ]);
        frame.render_widget(Paragraph::new(footer), chunks[3]);

        self.confirm.render(frame);
    }

    fn render_cards(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Registros ({}) ", self.records.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));

        if self.records.is_empty() {
            let text = if self.loading {
                "Carregando..."
            } else if self.search_term().is_some() {
                "Nenhuma anamnese encontrada para a busca."
            } else {
                "Nenhuma anamnese registrada. Pressione n para iniciar."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                    .block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = self.records.iter().map(card).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "Paciente sem nome"
    } else {
        name
    }
}

/// Two-line summary: name and age, then complaint, date and reliability
fn card(record: &Anamnese) -> ListItem<'static> {
    let ident = &record.record.identificacao;
    let complaint = record.chief_complaint();
    let complaint = if complaint.trim().is_empty() {
        "Sem queixa registrada".to_string()
    } else {
        complaint.to_string()
    };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                display_name(record.patient_name()).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", ident.idade),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!("  {}", complaint)),
            Span::styled(
                format!("  {}", record.created_at.format("%d/%m/%Y %H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("  Confiabilidade: {}", ident.grau_confiabilidade.label()),
                Style::default().fg(Color::Magenta),
            ),
        ]),
    ])
}
