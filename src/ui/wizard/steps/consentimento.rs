use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::{bind, Binding};
use crate::record::AnamneseDraft;
use crate::ui::form_field::FormField;

pub(super) fn bindings() -> Vec<Binding> {
    vec![
        bind!(text "Nome do Profissional *", "Dr(a). João Silva" => meta.profissional.nome),
        bind!(text "Registro Profissional", "CRM 12345" => meta.profissional.registro),
        bind!(text "Unidade de Atendimento", "Hospital Central" => meta.profissional.unidade),
        bind!(toggle "Consentimento do paciente obtido" => meta.consentimento),
    ]
}

pub(super) fn panel() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "Termo de Confidencialidade",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(
            "Os dados coletados serão utilizados exclusivamente para fins clínicos, respeitando \
             o sigilo médico-paciente (Código de Ética Médica e LGPD).",
        ),
        Line::from(Span::styled(
            "Confirme que o paciente consentiu com a coleta e o registro dos dados clínicos.",
            Style::default().fg(Color::Gray),
        )),
    ]
}
