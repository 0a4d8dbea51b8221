//! The anamnese record: typed sections, the in-progress draft, the persisted
//! form returned by the backend, and the patch type used to update a draft.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod lists;
mod sections;
mod smoking;
mod vocab;

pub use lists::*;
pub use sections::*;
pub use smoking::pack_years;
pub use vocab::*;

/// Record being filled in by the wizard (the body of `POST /anamneses`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnamneseDraft {
    pub meta: Meta,
    pub identificacao: Identificacao,
    pub queixa_principal: QueixaPrincipal,
    pub hda: Hda,
    pub interrogatorio_sistematico: InterrogatorioSistematico,
    pub antecedentes: Antecedentes,
    pub habitos: Habitos,
    pub psicossocial: Psicossocial,
}

impl AnamneseDraft {
    /// Fresh skeleton with every section at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: each section present in `patch` replaces the stored
    /// section whole; sections absent from the patch are left untouched.
    pub fn merge(&mut self, patch: RecordPatch) {
        let RecordPatch {
            meta,
            identificacao,
            queixa_principal,
            hda,
            interrogatorio_sistematico,
            antecedentes,
            habitos,
            psicossocial,
        } = patch;

        if let Some(meta) = meta {
            self.meta = meta;
        }
        if let Some(identificacao) = identificacao {
            self.identificacao = identificacao;
        }
        if let Some(queixa_principal) = queixa_principal {
            self.queixa_principal = queixa_principal;
        }
        if let Some(hda) = hda {
            self.hda = hda;
        }
        if let Some(interrogatorio_sistematico) = interrogatorio_sistematico {
            self.interrogatorio_sistematico = interrogatorio_sistematico;
        }
        if let Some(antecedentes) = antecedentes {
            self.antecedentes = antecedentes;
        }
        if let Some(habitos) = habitos {
            self.habitos = habitos;
        }
        if let Some(psicossocial) = psicossocial {
            self.psicossocial = psicossocial;
        }
    }

    /// Recompute derived fields before submission
    pub fn refresh_derived(&mut self) {
        self.habitos.tabagismo.refresh_pack_years();
    }
}

/// Partial update of a draft, one optional slot per top-level section.
///
/// Callers pass fully-formed sections; nested fields are not merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub meta: Option<Meta>,
    pub identificacao: Option<Identificacao>,
    pub queixa_principal: Option<QueixaPrincipal>,
    pub hda: Option<Hda>,
    pub interrogatorio_sistematico: Option<InterrogatorioSistematico>,
    pub antecedentes: Option<Antecedentes>,
    pub habitos: Option<Habitos>,
    pub psicossocial: Option<Psicossocial>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.sections().is_empty()
    }

    /// Names of the sections this patch replaces
    pub fn sections(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.meta.is_some() {
            names.push("meta");
        }
        if self.identificacao.is_some() {
            names.push("identificacao");
        }
        if self.queixa_principal.is_some() {
            names.push("queixa_principal");
        }
        if self.hda.is_some() {
            names.push("hda");
        }
        if self.interrogatorio_sistematico.is_some() {
            names.push("interrogatorio_sistematico");
        }
        if self.antecedentes.is_some() {
            names.push("antecedentes");
        }
        if self.habitos.is_some() {
            names.push("habitos");
        }
        if self.psicossocial.is_some() {
            names.push("psicossocial");
        }
        names
    }
}

macro_rules! patch_from_section {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(
            impl From<$ty> for RecordPatch {
                fn from(section: $ty) -> Self {
                    RecordPatch {
                        $field: Some(section),
                        ..RecordPatch::default()
                    }
                }
            }
        )+
    };
}

patch_from_section! {
    Meta => meta,
    Identificacao => identificacao,
    QueixaPrincipal => queixa_principal,
    Hda => hda,
    InterrogatorioSistematico => interrogatorio_sistematico,
    Antecedentes => antecedentes,
    Habitos => habitos,
    Psicossocial => psicossocial,
}

/// Record as stored by the backend. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anamnese {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(flatten)]
    pub record: AnamneseDraft,
    pub auditoria: Option<Auditoria>,
    #[serde(default)]
    pub resumo_clinico_ia: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Anamnese {
    pub fn patient_name(&self) -> &str {
        &self.record.identificacao.nome_completo
    }

    pub fn chief_complaint(&self) -> &str {
        &self.record.queixa_principal.texto_entre_aspas
    }
}
