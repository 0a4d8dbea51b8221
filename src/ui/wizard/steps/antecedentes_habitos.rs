use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::{bind, Binding};
use crate::record::{
    format_alergias, format_list, format_medicacoes, parse_alergias, parse_list,
    parse_medicacoes, AnamneseDraft,
};
use crate::ui::form_field::FormField;

pub(super) fn bindings() -> Vec<Binding> {
    vec![
        bind!(list "Doenças Crônicas", "Ex: Diabetes, Hipertensão (separe por vírgula)",
            format_list, parse_list => antecedentes.pessoais.cronicos),
        bind!(list "Alergias", "agente: reação; ...",
            format_alergias, parse_alergias => antecedentes.pessoais.alergias),
        bind!(list "Medicações em Uso", "nome | dose | posologia; ...",
            format_medicacoes, parse_medicacoes => antecedentes.pessoais.medicacoes_uso),
        bind!(list "Cirurgias e Hospitalizações",
            "Ex: Apendicectomia 2015, Internação por pneumonia 2020",
            format_list, parse_list => antecedentes.pessoais.cirurgias_hospitalizacoes),
        bind!(list "Imunizações Relevantes", "Separe por vírgula",
            format_list, parse_list => antecedentes.pessoais.imunizacoes_relevantes),
        bind!(text "Atividade Física", "Ex: Caminhada 3x/semana" => habitos.atividade_fisica.tipo),
        bind!(decimal "Sono (horas/dia)", "8" => habitos.sono.horas),
        bind!(text "Padrão Alimentar", "Descreva o padrão alimentar..." => habitos.alimentacao.padrao),
        bind!(select "Tabagismo" => habitos.tabagismo.status),
        bind!(decimal "Maços/dia", "1" => habitos.tabagismo.macos_dia),
        bind!(integer "Anos de tabagismo", "10" => habitos.tabagismo.anos),
        bind!(list "Etilismo (tipos)", "Ex: cerveja, destilados",
            format_list, parse_list => habitos.etilismo.tipos),
        bind!(integer "Doses/semana", "0" => habitos.etilismo.doses_semana),
        bind!(text "Outras Substâncias", "" => habitos.outras_substancias),
    ]
}

/// Shows the smoking exposure once there is one
pub(super) fn panel(record: &AnamneseDraft) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(
        "Antecedentes pessoais e hábitos de vida. Listas separadas por vírgula; \
         alergias e medicações por ponto e vírgula.",
    )];

    if let Some(display) = record.habitos.tabagismo.pack_years_display() {
        lines.push(Line::from(vec![
            Span::styled("Carga tabágica: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                display,
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    lines
}
