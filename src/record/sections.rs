//! Typed sections of the intake record.
//!
//! Field names follow the backend's JSON schema. Every struct defaults its
//! missing fields so older drafts and partial payloads still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vocab::{
    CorEtnia, EstadoCivil, GrauConfiabilidade, SexoBiologico, StatusTabagismo, UnidadeIdade,
    UnidadeTempo,
};

// ─── Meta ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub consentimento: bool,
    pub profissional: Profissional,
    pub timestamp_iso: DateTime<Utc>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            consentimento: false,
            profissional: Profissional::default(),
            timestamp_iso: Utc::now(),
        }
    }
}

/// Professional taking the history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profissional {
    pub nome: String,
    pub registro: String,
    pub unidade: String,
}

// ─── Identificação ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identificacao {
    pub nome_completo: String,
    pub nome_social: String,
    pub genero: String,
    pub sexo_biologico: SexoBiologico,
    pub idade: Idade,
    pub cor_etnia: CorEtnia,
    pub estado_civil: EstadoCivil,
    pub ocupacao: Ocupacao,
    pub escolaridade: String,
    pub religiao: String,
    pub naturalidade: Localidade,
    pub procedencia: Localidade,
    pub mae: String,
    pub responsavel_ou_cuidador: String,
    pub plano_ou_previdencia: String,
    pub grau_confiabilidade: GrauConfiabilidade,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Idade {
    pub valor: i64,
    pub unidade: UnidadeIdade,
}

impl std::fmt::Display for Idade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.valor, self.unidade)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocupacao {
    pub atividade: String,
    pub local: String,
    pub condicoes: String,
}

/// City and state (UF)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localidade {
    pub cidade: String,
    pub uf: String,
}

impl std::fmt::Display for Localidade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.cidade, self.uf)
    }
}

// ─── Queixa principal ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueixaPrincipal {
    /// Complaint in the patient's own words
    pub texto_entre_aspas: String,
    pub inicio: Inicio,
}

/// How long ago the complaint started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inicio {
    #[serde(rename = "há")]
    pub ha: i64,
    pub unidade: UnidadeTempo,
}

impl std::fmt::Display for Inicio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "há {} {}", self.ha, self.unidade)
    }
}

// ─── HDA ─────────────────────────────────────────────────────────────────────

/// História da doença atual
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hda {
    pub narrativa: String,
    pub sintomas_principais: Vec<Sintoma>,
    pub impacto_vida: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sintoma {
    pub nome: String,
    pub localizacao: String,
    pub caracteristicas: String,
    pub intensidade_0a10: Option<u8>,
    pub cronologia: Cronologia,
    pub situacoes: String,
    pub fatores_agrava: String,
    pub fatores_alivia: String,
    pub associados: String,
    pub pertinentes_positivos: Vec<String>,
    pub pertinentes_negativos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cronologia {
    pub inicio: String,
    pub duracao: String,
    pub frequencia: String,
}

// ─── Interrogatório sistemático ──────────────────────────────────────────────

/// Body systems reviewed during the systematic interrogation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodySystem {
    Geral,
    Respiratorio,
    Cardiovascular,
    Gastrointestinal,
    Geniturinario,
    Musculoesqueletico,
    Neurologico,
    Psiquiatrico,
    Endocrino,
    Hemato,
    Pele,
    Reprodutivo,
}

impl BodySystem {
    pub const ALL: [BodySystem; 12] = [
        BodySystem::Geral,
        BodySystem::Respiratorio,
        BodySystem::Cardiovascular,
        BodySystem::Gastrointestinal,
        BodySystem::Geniturinario,
        BodySystem::Musculoesqueletico,
        BodySystem::Neurologico,
        BodySystem::Psiquiatrico,
        BodySystem::Endocrino,
        BodySystem::Hemato,
        BodySystem::Pele,
        BodySystem::Reprodutivo,
    ];

    /// Systems asked about in the wizard (the rest are carried but not prompted)
    pub const PROMPTED: [BodySystem; 9] = [
        BodySystem::Geral,
        BodySystem::Respiratorio,
        BodySystem::Cardiovascular,
        BodySystem::Gastrointestinal,
        BodySystem::Geniturinario,
        BodySystem::Musculoesqueletico,
        BodySystem::Neurologico,
        BodySystem::Psiquiatrico,
        BodySystem::Pele,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BodySystem::Geral => "geral",
            BodySystem::Respiratorio => "respiratorio",
            BodySystem::Cardiovascular => "cardiovascular",
            BodySystem::Gastrointestinal => "gastrointestinal",
            BodySystem::Geniturinario => "geniturinario",
            BodySystem::Musculoesqueletico => "musculoesqueletico",
            BodySystem::Neurologico => "neurologico",
            BodySystem::Psiquiatrico => "psiquiatrico",
            BodySystem::Endocrino => "endocrino",
            BodySystem::Hemato => "hemato",
            BodySystem::Pele => "pele",
            BodySystem::Reprodutivo => "reprodutivo",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BodySystem::Geral => "Geral",
            BodySystem::Respiratorio => "Respiratório",
            BodySystem::Cardiovascular => "Cardiovascular",
            BodySystem::Gastrointestinal => "Gastrointestinal",
            BodySystem::Geniturinario => "Geniturinário",
            BodySystem::Musculoesqueletico => "Musculoesquelético",
            BodySystem::Neurologico => "Neurológico",
            BodySystem::Psiquiatrico => "Psiquiátrico",
            BodySystem::Endocrino => "Endócrino",
            BodySystem::Hemato => "Hematológico",
            BodySystem::Pele => "Pele e Anexos",
            BodySystem::Reprodutivo => "Reprodutivo",
        }
    }

    /// Broad, non-leading question asked for this system
    pub fn umbrella_question(&self) -> &'static str {
        match self {
            BodySystem::Geral => "Como tem se sentido no geral? Febre, perda de peso, fadiga?",
            BodySystem::Respiratorio => {
                "Como tem estado sua respiração? Falta de ar, tosse, chiado?"
            }
            BodySystem::Cardiovascular => {
                "Sente palpitações, dor no peito, inchaço nas pernas?"
            }
            BodySystem::Gastrointestinal => {
                "Algum problema com alimentação ou intestinos? Náusea, vômito, diarreia?"
            }
            BodySystem::Geniturinario => {
                "Como está a urina? Dor ao urinar, sangue, frequência alterada?"
            }
            BodySystem::Musculoesqueletico => {
                "Sente dores nas articulações ou músculos? Rigidez, limitação de movimento?"
            }
            BodySystem::Neurologico => "Tem tonturas, dor de cabeça, formigamentos, fraqueza?",
            BodySystem::Psiquiatrico => {
                "Como tem se sentido emocionalmente? Ansiedade, tristeza, sono?"
            }
            BodySystem::Endocrino => "Sede excessiva, intolerância ao calor ou ao frio?",
            BodySystem::Hemato => "Sangramentos fáceis, manchas roxas, ínguas?",
            BodySystem::Pele => {
                "Manchas, coceira, lesões na pele? Problemas com cabelo ou unhas?"
            }
            BodySystem::Reprodutivo => "Alguma alteração menstrual, sexual ou reprodutiva?",
        }
    }
}

/// Answers for one body system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SistemaIs {
    pub pergunta_guarda_chuva: String,
    pub itens: Vec<ItemIs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemIs {
    pub sintoma: String,
    pub presente: bool,
    pub detalhes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterrogatorioSistematico {
    pub geral: SistemaIs,
    pub respiratorio: SistemaIs,
    pub cardiovascular: SistemaIs,
    pub gastrointestinal: SistemaIs,
    pub geniturinario: SistemaIs,
    pub musculoesqueletico: SistemaIs,
    pub neurologico: SistemaIs,
    pub psiquiatrico: SistemaIs,
    pub endocrino: SistemaIs,
    pub hemato: SistemaIs,
    pub pele: SistemaIs,
    pub reprodutivo: SistemaIs,
}

impl InterrogatorioSistematico {
    pub fn system(&self, system: BodySystem) -> &SistemaIs {
        match system {
            BodySystem::Geral => &self.geral,
            BodySystem::Respiratorio => &self.respiratorio,
            BodySystem::Cardiovascular => &self.cardiovascular,
            BodySystem::Gastrointestinal => &self.gastrointestinal,
            BodySystem::Geniturinario => &self.geniturinario,
            BodySystem::Musculoesqueletico => &self.musculoesqueletico,
            BodySystem::Neurologico => &self.neurologico,
            BodySystem::Psiquiatrico => &self.psiquiatrico,
            BodySystem::Endocrino => &self.endocrino,
            BodySystem::Hemato => &self.hemato,
            BodySystem::Pele => &self.pele,
            BodySystem::Reprodutivo => &self.reprodutivo,
        }
    }

    pub fn system_mut(&mut self, system: BodySystem) -> &mut SistemaIs {
        match system {
            BodySystem::Geral => &mut self.geral,
            BodySystem::Respiratorio => &mut self.respiratorio,
            BodySystem::Cardiovascular => &mut self.cardiovascular,
            BodySystem::Gastrointestinal => &mut self.gastrointestinal,
            BodySystem::Geniturinario => &mut self.geniturinario,
            BodySystem::Musculoesqueletico => &mut self.musculoesqueletico,
            BodySystem::Neurologico => &mut self.neurologico,
            BodySystem::Psiquiatrico => &mut self.psiquiatrico,
            BodySystem::Endocrino => &mut self.endocrino,
            BodySystem::Hemato => &mut self.hemato,
            BodySystem::Pele => &mut self.pele,
            BodySystem::Reprodutivo => &mut self.reprodutivo,
        }
    }

    /// Systems with a non-empty answer, in review order
    pub fn answered(&self) -> Vec<(BodySystem, &SistemaIs)> {
        BodySystem::ALL
            .iter()
            .map(|s| (*s, self.system(*s)))
            .filter(|(_, answer)| {
                !answer.pergunta_guarda_chuva.trim().is_empty() || !answer.itens.is_empty()
            })
            .collect()
    }
}

// ─── Antecedentes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Antecedentes {
    pub pessoais: AntecedentesPessoais,
    pub familiares: Vec<AntecedenteFamiliar>,
    pub estado_atual: EstadoAtual,
    pub linha_do_tempo: Vec<EventoLinhaTempo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntecedentesPessoais {
    pub cronicos: Vec<String>,
    pub alergias: Vec<Alergia>,
    pub medicacoes_uso: Vec<Medicacao>,
    pub cirurgias_hospitalizacoes: Vec<String>,
    pub imunizacoes_relevantes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alergia {
    pub agente: String,
    pub reacao: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medicacao {
    pub nome: String,
    pub dose: String,
    pub posologia: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntecedenteFamiliar {
    pub parentesco: String,
    pub condicao: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstadoAtual {
    pub fisico: String,
    pub mental: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventoLinhaTempo {
    pub ano: String,
    pub evento: String,
}

// ─── Hábitos ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Habitos {
    pub atividade_fisica: AtividadeFisica,
    pub sono: Sono,
    pub alimentacao: Alimentacao,
    pub tabagismo: Tabagismo,
    pub etilismo: Etilismo,
    pub outras_substancias: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtividadeFisica {
    pub tipo: String,
    pub frequencia_semana: i64,
    pub duracao_min: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sono {
    pub horas: f64,
    pub qualidade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alimentacao {
    pub padrao: String,
    pub restricoes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tabagismo {
    pub status: StatusTabagismo,
    pub macos_dia: f64,
    pub anos: i64,
    /// Derived from `macos_dia × anos`; see [`super::pack_years`]
    pub carga_tabagica_packyears: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Etilismo {
    pub tipos: Vec<String>,
    pub doses_semana: i64,
    pub uso_pesado_ep: bool,
}

// ─── Psicossocial ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Psicossocial {
    pub composicao_familiar: String,
    pub dependentes: i64,
    pub renda_familiar_faixa: String,
    pub saneamento: String,
    pub agua_segura: String,
    pub riscos_ocupacionais: String,
    pub suporte_social: String,
    pub crencas_praticas_culturais: String,
    pub barreiras_acesso: String,
}

// ─── Auditoria ───────────────────────────────────────────────────────────────

/// Audit block stamped by the backend on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auditoria {
    pub data_hora_anamnese: DateTime<Utc>,
    #[serde(default = "default_versao")]
    pub versao_registro: i64,
}

fn default_versao() -> i64 {
    1
}
