//! Read-only view of one stored record, with export and summary actions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::{ApiError, ExportFormat};
use crate::record::{format_alergias, format_list, Anamnese, StatusTabagismo, Vocabulary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    None,
    Back,
    Export(ExportFormat),
    GenerateSummary,
}

#[derive(Debug, Clone, PartialEq)]
enum Loaded {
    Loading,
    Found(Box<Anamnese>),
    NotFound,
}

pub struct DetailView {
    id: String,
    state: Loaded,
    generating: bool,
    scroll: u16,
}

impl DetailView {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Loaded::Loading,
            generating: false,
            scroll: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> Option<&Anamnese> {
        match &self.state {
            Loaded::Found(record) => Some(&**record),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.state == Loaded::NotFound
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Apply the fetch result. Any failure shows the placeholder.
    pub fn set_loaded(&mut self, result: Result<Anamnese, ApiError>) {
        self.state = match result {
            Ok(record) => Loaded::Found(Box::new(record)),
            Err(_) => Loaded::NotFound,
        };
    }

    /// Mark a summary request as in flight; `false` if one already is
    pub fn begin_summary(&mut self) -> bool {
        if self.generating || self.record().is_none() {
            return false;
        }
        self.generating = true;
        true
    }

    /// Finish a summary request; only success touches the record
    pub fn finish_summary(&mut self, result: Result<String, ApiError>) {
        self.generating = false;
        if let (Ok(summary), Loaded::Found(record)) = (result, &mut self.state) {
            record.resumo_clinico_ia = Some(summary);
        }
    }

    /// Move the body, keeping the last line on screen
    fn scroll_by(&mut self, delta: i32) {
        let last = self.body_lines().len().saturating_sub(1);
        let last = u16::try_from(last).unwrap_or(u16::MAX);
        let target = (i32::from(self.scroll) + delta).max(0);
        self.scroll = u16::try_from(target).unwrap_or(u16::MAX).min(last);
    }

    fn body_lines(&self) -> Vec<Line<'static>> {
        match &self.state {
            Loaded::Loading => vec![Line::from(Span::styled(
                "Carregando...",
                Style::default().fg(Color::DarkGray),
            ))],
            Loaded::NotFound => vec![Line::from(Span::styled(
                "Anamnese não encontrada",
                Style::default().fg(Color::Red),
            ))],
            Loaded::Found(record) => record_lines(record, self.generating),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DetailAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => DetailAction::Back,
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_by(1);
                DetailAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_by(-1);
                DetailAction::None
            }
            KeyCode::PageDown => {
                self.scroll_by(10);
                DetailAction::None
            }
            KeyCode::PageUp => {
                self.scroll_by(-10);
                DetailAction::None
            }
            _ if self.record().is_none() => DetailAction::None,
            KeyCode::Char('p') => DetailAction::Export(ExportFormat::Pdf),
            KeyCode::Char('e') => DetailAction::Export(ExportFormat::Json),
            KeyCode::Char('g') if !self.generating => DetailAction::GenerateSummary,
            _ => DetailAction::None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Detalhes da Anamnese",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );

        frame.render_widget(
            Paragraph::new(self.body_lines())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Gray)),
                )
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            chunks[1],
        );

        let key = Style::default().fg(Color::Yellow);
        let mut hints = vec![Span::styled("Esc", key), Span::raw(" voltar  ")];
        if self.record().is_some() {
            hints.extend([
                Span::styled("p", key),
                Span::raw(" PDF  "),
                Span::styled("e", key),
                Span::raw(" JSON  "),
                Span::styled("g", key),
                Span::raw(if self.generating {
                    " gerando resumo..."
                } else {
                    " gerar resumo"
                }),
            ]);
        }
        frame.render_widget(Paragraph::new(Line::from(hints)), chunks[2]);
    }
}

fn heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::raw(value.into()),
    ])
}

/// Full record as styled lines, in the order the sections are filled in
pub(crate) fn record_lines(anamnese: &Anamnese, generating: bool) -> Vec<Line<'static>> {
    let record = &anamnese.record;
    let ident = &record.identificacao;
    let mut lines = vec![heading("Identificação"), field("Nome", ident.nome_completo.clone())];

    if !ident.nome_social.is_empty() {
        lines.push(field("Nome Social", ident.nome_social.clone()));
    }
    let mut sexo = ident.sexo_biologico.label().to_string();
    if !ident.genero.is_empty() {
        sexo.push_str(&format!(" ({})", ident.genero));
    }
    lines.extend([
        field("Idade", ident.idade.to_string()),
        field("Sexo", sexo),
        field("Cor/Etnia", ident.cor_etnia.label()),
        field("Estado Civil", ident.estado_civil.label()),
        field("Ocupação", ident.ocupacao.atividade.clone()),
        field("Naturalidade", ident.naturalidade.to_string()),
        field("Procedência", ident.procedencia.to_string()),
        field("Confiabilidade", ident.grau_confiabilidade.label()),
        Line::default(),
        heading("Queixa Principal"),
        Line::from(Span::styled(
            format!("\"{}\"", record.queixa_principal.texto_entre_aspas),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        field("Início", record.queixa_principal.inicio.to_string()),
        Line::default(),
        heading("História da Doença Atual"),
    ]);
    lines.extend(record.hda.narrativa.lines().map(|l| Line::from(l.to_string())));
    if !record.hda.impacto_vida.is_empty() {
        lines.push(field("Impacto na vida", record.hda.impacto_vida.clone()));
    }

    let answered = record.interrogatorio_sistematico.answered();
    if !answered.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Interrogatório Sistemático"));
        for (system, answer) in answered {
            lines.push(field(system.title(), answer.pergunta_guarda_chuva.clone()));
        }
    }

    let pessoais = &record.antecedentes.pessoais;
    lines.push(Line::default());
    lines.push(heading("Antecedentes"));
    if !pessoais.cronicos.is_empty() {
        lines.push(field("Crônicos", format_list(&pessoais.cronicos)));
    }
    if !pessoais.alergias.is_empty() {
        lines.push(field("Alergias", format_alergias(&pessoais.alergias)));
    }
    if !pessoais.medicacoes_uso.is_empty() {
        lines.push(field("Medicações em uso", ""));
        for m in &pessoais.medicacoes_uso {
            lines.push(Line::from(format!("  • {} - {} - {}", m.nome, m.dose, m.posologia)));
        }
    }

    let habitos = &record.habitos;
    lines.push(Line::default());
    lines.push(heading("Hábitos de Vida"));
    let mut tabagismo = habitos.tabagismo.status.label().to_string();
    if habitos.tabagismo.status != StatusTabagismo::Nunca {
        tabagismo.push_str(&format!(
            " ({} pack-years)",
            habitos.tabagismo.carga_tabagica_packyears
        ));
    }
    lines.push(field("Tabagismo", tabagismo));
    let mut etilismo = format!("{} doses/semana", habitos.etilismo.doses_semana);
    if habitos.etilismo.uso_pesado_ep {
        etilismo.push_str(" (uso pesado episódico)");
    }
    lines.push(field("Etilismo", etilismo));
    if !habitos.atividade_fisica.tipo.is_empty() {
        lines.push(field(
            "Atividade física",
            format!(
                "{}, {}x/semana, {} min",
                habitos.atividade_fisica.tipo,
                habitos.atividade_fisica.frequencia_semana,
                habitos.atividade_fisica.duracao_min
            ),
        ));
    }
    if habitos.sono.horas > 0.0 {
        lines.push(field(
            "Sono",
            format!("{}h ({})", habitos.sono.horas, habitos.sono.qualidade),
        ));
    }

    lines.push(Line::default());
    lines.push(heading("Resumo Clínico (IA)"));
    match (&anamnese.resumo_clinico_ia, generating) {
        (_, true) => lines.push(Line::from(Span::styled(
            "Gerando resumo...",
            Style::default().fg(Color::DarkGray),
        ))),
        (Some(summary), false) => {
            lines.extend(summary.lines().map(|l| Line::from(l.to_string())));
        }
        (None, false) => lines.push(Line::from(Span::styled(
            "Nenhum resumo gerado. Pressione g para gerar.",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    lines
}

/// Plain-text rendering of a record, for the command line
pub fn record_text(anamnese: &Anamnese) -> String {
    record_lines(anamnese, false)
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample() -> Anamnese {
        serde_json::from_value(serde_json::json!({
            "id": "abc",
            "identificacao": {"nome_completo": "Ana Souza"},
            "queixa_principal": {"texto_entre_aspas": "Tosse seca"},
            "antecedentes": {"pessoais": {"cronicos": ["HAS", "DM2"]}},
            "created_at": "2026-01-02T10:00:00Z",
            "updated_at": "2026-01-02T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_unknown_id_shows_placeholder() {
        let mut view = DetailView::new("missing");
        view.set_loaded(Err(ApiError::not_found("GET anamneses/missing")));
        assert!(view.is_not_found());
        assert_eq!(view.handle_key(key(KeyCode::Char('p'))), DetailAction::None);
        assert_eq!(view.handle_key(key(KeyCode::Esc)), DetailAction::Back);
    }

    #[test]
    fn test_scroll_stops_at_last_line() {
        let mut view = DetailView::new("abc");
        view.set_loaded(Ok(sample()));
        let last = view.body_lines().len() as u16 - 1;

        for _ in 0..50 {
            view.handle_key(key(KeyCode::PageDown));
        }
        assert_eq!(view.scroll, last);

        view.handle_key(key(KeyCode::Up));
        assert_eq!(view.scroll, last - 1);
        for _ in 0..50 {
            view.handle_key(key(KeyCode::PageUp));
        }
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn test_summary_success_replaces_text() {
        let mut view = DetailView::new("abc");
        view.set_loaded(Ok(sample()));

        assert_eq!(
            view.handle_key(key(KeyCode::Char('g'))),
            DetailAction::GenerateSummary
        );
        assert!(view.begin_summary());
        assert!(!view.begin_summary());
        assert_eq!(view.handle_key(key(KeyCode::Char('g'))), DetailAction::None);

        view.finish_summary(Ok("Paciente com tosse.".to_string()));
        assert!(!view.is_generating());
        assert_eq!(
            view.record().and_then(|r| r.resumo_clinico_ia.as_deref()),
            Some("Paciente com tosse.")
        );
    }

    #[test]
    fn test_summary_failure_keeps_prior_state() {
        let mut view = DetailView::new("abc");
        let mut record = sample();
        record.resumo_clinico_ia = Some("anterior".to_string());
        view.set_loaded(Ok(record));

        assert!(view.begin_summary());
        view.finish_summary(Err(ApiError::http("POST", 500, "boom")));
        assert_eq!(
            view.record().and_then(|r| r.resumo_clinico_ia.as_deref()),
            Some("anterior")
        );
    }

    #[test]
    fn test_export_keys() {
        let mut view = DetailView::new("abc");
        view.set_loaded(Ok(sample()));
        assert_eq!(
            view.handle_key(key(KeyCode::Char('p'))),
            DetailAction::Export(ExportFormat::Pdf)
        );
        assert_eq!(
            view.handle_key(key(KeyCode::Char('e'))),
            DetailAction::Export(ExportFormat::Json)
        );
    }

    #[test]
    fn test_record_lines_include_sections() {
        let rendered = record_text(&sample());
        assert!(rendered.contains("Nome: Ana Souza"));
        assert!(rendered.contains("\"Tosse seca\""));
        assert!(rendered.contains("Crônicos: HAS, DM2"));
        assert!(rendered.contains("Nenhum resumo gerado"));
        assert!(!rendered.contains("Interrogatório Sistemático"));
    }
}
