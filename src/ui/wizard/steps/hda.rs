use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::{bind, Binding};
use crate::record::AnamneseDraft;
use crate::ui::form_field::FormField;

pub(super) fn bindings() -> Vec<Binding> {
    vec![
        bind!(multiline "História da Doença Atual (HDA) *",
            "Descreva cronologicamente o início, evolução e características dos sintomas..."
            => hda.narrativa),
        bind!(multiline "Impacto na Vida Diária",
            "Como os sintomas afetam as atividades diárias, trabalho, sono, etc."
            => hda.impacto_vida),
    ]
}

pub(super) fn panel() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "Atributos do Sintoma",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(
            "Inclua na narrativa: localização, características, intensidade, cronologia, \
             situações de ocorrência, fatores que agravam/aliviam e manifestações associadas.",
        ),
    ]
}
