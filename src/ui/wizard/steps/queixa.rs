use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::{bind, Binding};
use crate::record::AnamneseDraft;
use crate::ui::form_field::FormField;

const SUPPORT_QUESTIONS: [&str; 4] = [
    "Qual o motivo da consulta?",
    "O que está sentindo?",
    "Há quanto tempo?",
    "O que mais incomoda?",
];

pub(super) fn bindings() -> Vec<Binding> {
    vec![
        bind!(multiline "Queixa Principal (com as palavras do paciente) *",
            "\"Estou com muita dor no peito há 3 dias\"" => queixa_principal.texto_entre_aspas),
        bind!(integer "Tempo de Evolução", "3" => queixa_principal.inicio.ha),
        bind!(select "Unidade" => queixa_principal.inicio.unidade),
    ]
}

pub(super) fn panel() -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Perguntas de Apoio",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.extend(
        SUPPORT_QUESTIONS
            .iter()
            .map(|q| Line::from(format!("  • {}", q))),
    );
    lines
}
