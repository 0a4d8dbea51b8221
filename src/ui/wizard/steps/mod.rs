//! Field bindings and info panels for each wizard step.
//!
//! A binding builds its widget from the record and writes the widget's value
//! back as a patch carrying the whole (read-modify-write) section.

use ratatui::text::Line;

use crate::record::{AnamneseDraft, RecordPatch};
use crate::ui::form_field::FormField;
use crate::wizard::WizardStep;

mod antecedentes_habitos;
mod consentimento;
mod hda;
mod identificacao;
mod interrogatorio;
mod psicossocial;
mod queixa;

type BuildFn = Box<dyn Fn(&AnamneseDraft) -> FormField>;
type WriteFn = Box<dyn Fn(&AnamneseDraft, &FormField) -> RecordPatch>;

pub struct Binding {
    pub label: String,
    build: BuildFn,
    write: WriteFn,
}

impl Binding {
    pub fn new(
        label: impl Into<String>,
        build: impl Fn(&AnamneseDraft) -> FormField + 'static,
        write: impl Fn(&AnamneseDraft, &FormField) -> RecordPatch + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            build: Box::new(build),
            write: Box::new(write),
        }
    }

    pub fn build(&self, record: &AnamneseDraft) -> FormField {
        (self.build)(record)
    }

    pub fn write(&self, record: &AnamneseDraft, field: &FormField) -> RecordPatch {
        (self.write)(record, field)
    }
}

/// Binding for `section.path...` with the given widget kind
macro_rules! bind {
    (@write $f:ident => $value:expr ; $section:ident $(. $path:ident)+) => {
        |r: &AnamneseDraft, $f: &FormField| {
            let mut section = r.$section.clone();
            section$(.$path)+ = $value;
            section.into()
        }
    };
    (text $label:expr, $placeholder:expr => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::text(&r.$section$(.$path)+, $placeholder),
            bind!(@write f => f.value(); $section $(. $path)+),
        )
    };
    (multiline $label:expr, $placeholder:expr => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::multiline(&r.$section$(.$path)+, $placeholder),
            bind!(@write f => f.value(); $section $(. $path)+),
        )
    };
    (integer $label:expr, $placeholder:expr => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::integer(r.$section$(.$path)+, $placeholder),
            bind!(@write f => f.as_i64(); $section $(. $path)+),
        )
    };
    (decimal $label:expr, $placeholder:expr => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::decimal(r.$section$(.$path)+, $placeholder),
            bind!(@write f => f.as_f64(); $section $(. $path)+),
        )
    };
    (select $label:expr => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::select(r.$section$(.$path)+),
            bind!(@write f => f.selected(); $section $(. $path)+),
        )
    };
    (toggle $label:expr => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::toggle(r.$section$(.$path)+, "Sim", "Não"),
            bind!(@write f => f.checked(); $section $(. $path)+),
        )
    };
    // List fields edited as one line of text
    (list $label:expr, $placeholder:expr, $format:path, $parse:path => $section:ident $(. $path:ident)+) => {
        Binding::new(
            $label,
            |r: &AnamneseDraft| FormField::text(&$format(&r.$section$(.$path)+), $placeholder),
            bind!(@write f => $parse(&f.value()); $section $(. $path)+),
        )
    };
}

pub(crate) use bind;

pub fn bindings(step: WizardStep) -> Vec<Binding> {
    match step {
        WizardStep::Consentimento => consentimento::bindings(),
        WizardStep::Identificacao => identificacao::bindings(),
        WizardStep::Queixa => queixa::bindings(),
        WizardStep::Hda => hda::bindings(),
        WizardStep::Interrogatorio => interrogatorio::bindings(),
        WizardStep::AntecedentesHabitos => antecedentes_habitos::bindings(),
        WizardStep::PsicossocialRevisao => psicossocial::bindings(),
    }
}

/// Guidance shown above the fields; may depend on the record and the
/// focused field.
pub fn panel(step: WizardStep, record: &AnamneseDraft, focus: usize) -> Vec<Line<'static>> {
    match step {
        WizardStep::Consentimento => consentimento::panel(),
        WizardStep::Identificacao => identificacao::panel(),
        WizardStep::Queixa => queixa::panel(),
        WizardStep::Hda => hda::panel(),
        WizardStep::Interrogatorio => interrogatorio::panel(focus),
        WizardStep::AntecedentesHabitos => antecedentes_habitos::panel(record),
        WizardStep::PsicossocialRevisao => psicossocial::panel(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_step_has_fields() {
        for step in WizardStep::ALL {
            assert!(!bindings(step).is_empty(), "{} has no fields", step.id());
        }
    }

    #[test]
    fn test_bindings_write_back_what_they_build() {
        // Writing an unedited field must not change the record
        let mut record = AnamneseDraft::new();
        record.identificacao.nome_completo = "Ana Souza".to_string();
        record.identificacao.idade.valor = 34;
        record.habitos.sono.horas = 7.5;
        record.antecedentes.pessoais.cronicos = vec!["Asma".to_string()];

        for step in WizardStep::ALL {
            for binding in bindings(step) {
                let field = binding.build(&record);
                let mut after = record.clone();
                after.merge(binding.write(&record, &field));
                assert_eq!(after, record, "binding {} altered the record", binding.label);
            }
        }
    }

    #[test]
    fn test_write_returns_single_section() {
        let record = AnamneseDraft::new();
        for step in WizardStep::ALL {
            for binding in bindings(step) {
                let field = binding.build(&record);
                assert_eq!(binding.write(&record, &field).sections().len(), 1);
            }
        }
    }
}
