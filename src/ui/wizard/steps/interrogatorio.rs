use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::Binding;
use crate::record::{AnamneseDraft, BodySystem};
use crate::ui::form_field::FormField;

pub(super) fn bindings() -> Vec<Binding> {
    BodySystem::PROMPTED
        .iter()
        .map(|&system| {
            Binding::new(
                system.title(),
                move |r: &AnamneseDraft| {
                    FormField::multiline(
                        &r.interrogatorio_sistematico
                            .system(system)
                            .pergunta_guarda_chuva,
                        "Registre a resposta do paciente...",
                    )
                },
                move |r: &AnamneseDraft, f: &FormField| {
                    let mut section = r.interrogatorio_sistematico.clone();
                    section.system_mut(system).pergunta_guarda_chuva = f.value();
                    section.into()
                },
            )
        })
        .collect()
}

/// The focused system is the expanded one: its umbrella question is shown
pub(super) fn panel(focus: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Interrogatório Sistemático",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(
            "Perguntas amplas e não indutoras sobre cada sistema. Registre observações \
             relevantes (positivas ou negativas).",
        ),
    ];

    if let Some(system) = BodySystem::PROMPTED.get(focus) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", system.title()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("\"{}\"", system.umbrella_question()),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_binding_per_prompted_system() {
        let labels: Vec<String> = bindings().into_iter().map(|b| b.label).collect();
        assert_eq!(labels.len(), BodySystem::PROMPTED.len());
        assert_eq!(labels[0], "Geral");
        assert_eq!(labels[8], "Pele e Anexos");
    }

    #[test]
    fn test_answer_lands_in_its_system() {
        let record = AnamneseDraft::new();
        let bindings = bindings();
        let cardio = &bindings[2];

        let field = FormField::multiline("Nega palpitações", "");
        let mut after = record.clone();
        after.merge(cardio.write(&record, &field));

        assert_eq!(
            after.interrogatorio_sistematico.cardiovascular.pergunta_guarda_chuva,
            "Nega palpitações"
        );
        assert!(after.interrogatorio_sistematico.geral.pergunta_guarda_chuva.is_empty());
    }

    #[test]
    fn test_panel_shows_focused_question() {
        let lines = panel(1);
        let text: String = lines[2].spans.iter().map(|s| s.content.to_string()).collect();
        assert!(text.starts_with("Respiratório"));
    }
}
