use ratatui::text::Line;

use super::{bind, Binding};
use crate::record::AnamneseDraft;
use crate::ui::form_field::FormField;

pub(super) fn bindings() -> Vec<Binding> {
    vec![
        bind!(text "Nome Completo *", "Nome completo sem abreviações" => identificacao.nome_completo),
        bind!(text "Nome Social", "Se aplicável" => identificacao.nome_social),
        bind!(text "Gênero", "Cisgênero, transgênero, não-binário..." => identificacao.genero),
        bind!(select "Sexo Biológico *" => identificacao.sexo_biologico),
        bind!(integer "Idade *", "34" => identificacao.idade.valor),
        bind!(select "Unidade da idade" => identificacao.idade.unidade),
        bind!(select "Cor/Etnia *" => identificacao.cor_etnia),
        bind!(select "Estado Civil *" => identificacao.estado_civil),
        bind!(text "Escolaridade", "Ex: Ensino superior completo" => identificacao.escolaridade),
        bind!(text "Religião", "" => identificacao.religiao),
        bind!(text "Atividade/Profissão", "Ex: Enfermeiro(a)" => identificacao.ocupacao.atividade),
        bind!(text "Local de Trabalho", "Ex: Hospital XYZ" => identificacao.ocupacao.local),
        bind!(text "Condições de Trabalho", "Turnos, exposições, esforço" => identificacao.ocupacao.condicoes),
        bind!(text "Naturalidade (Cidade)", "" => identificacao.naturalidade.cidade),
        bind!(text "Naturalidade (UF)", "SP" => identificacao.naturalidade.uf),
        bind!(text "Procedência (Cidade)", "" => identificacao.procedencia.cidade),
        bind!(text "Procedência (UF)", "RJ" => identificacao.procedencia.uf),
        bind!(text "Nome da Mãe", "" => identificacao.mae),
        bind!(text "Responsável/Cuidador", "Se aplicável" => identificacao.responsavel_ou_cuidador),
        bind!(text "Plano de Saúde/Previdência", "SUS, convênio..." => identificacao.plano_ou_previdencia),
    ]
}

pub(super) fn panel() -> Vec<Line<'static>> {
    vec![Line::from(
        "Dados pessoais, ocupação e localização do paciente. Campos com * são essenciais.",
    )]
}
