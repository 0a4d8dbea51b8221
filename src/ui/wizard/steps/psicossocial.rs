use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::{bind, Binding};
use crate::record::{AnamneseDraft, Vocabulary};
use crate::ui::form_field::FormField;

pub(super) fn bindings() -> Vec<Binding> {
    vec![
        bind!(multiline "Composição Familiar", "Com quem mora? Quantas pessoas?"
            => psicossocial.composicao_familiar),
        bind!(integer "Número de Dependentes", "0" => psicossocial.dependentes),
        bind!(text "Renda Familiar (faixa)", "Ex: 2-3 salários mínimos"
            => psicossocial.renda_familiar_faixa),
        bind!(text "Saneamento Básico", "Esgoto, coleta de lixo, etc." => psicossocial.saneamento),
        bind!(text "Água Segura", "Rede pública, poço, filtrada..." => psicossocial.agua_segura),
        bind!(text "Riscos Ocupacionais", "" => psicossocial.riscos_ocupacionais),
        bind!(text "Suporte Social", "Família, amigos, comunidade" => psicossocial.suporte_social),
        bind!(text "Crenças e Práticas Culturais", "" => psicossocial.crencas_praticas_culturais),
        bind!(multiline "Barreiras de Acesso à Saúde",
            "Transporte, tempo, alfabetização em saúde, etc." => psicossocial.barreiras_acesso),
        bind!(select "Grau de Confiabilidade da História" => identificacao.grau_confiabilidade),
    ]
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.trim().to_string()
    }
}

/// Final review of the key facts before saving
pub(super) fn panel(record: &AnamneseDraft) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let ident = &record.identificacao;

    let mut lines = vec![
        Line::from(Span::styled(
            "Revisão Final",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Paciente: ", label),
            Span::raw(or_dash(&ident.nome_completo)),
            Span::styled("  Idade: ", label),
            Span::raw(ident.idade.to_string()),
            Span::styled("  Confiabilidade: ", label),
            Span::raw(ident.grau_confiabilidade.label()),
        ]),
        Line::from(vec![
            Span::styled("Queixa: ", label),
            Span::raw(or_dash(&record.queixa_principal.texto_entre_aspas)),
            Span::styled("  Início: ", label),
            Span::raw(record.queixa_principal.inicio.to_string()),
        ]),
    ];

    if !record.meta.consentimento {
        lines.push(Line::from(Span::styled(
            "Consentimento não registrado",
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_flags_missing_consent() {
        let record = AnamneseDraft::new();
        let text: String = panel(&record)
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("Consentimento não registrado"));
        assert!(text.contains("Paciente: -"));
    }

    #[test]
    fn test_reliability_writes_to_identification() {
        let record = AnamneseDraft::new();
        let binding = bindings().pop().unwrap();
        let mut field = binding.build(&record);
        field.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Left,
            crossterm::event::KeyModifiers::NONE,
        ));

        let patch = binding.write(&record, &field);
        assert_eq!(patch.sections(), vec!["identificacao"]);
    }
}
