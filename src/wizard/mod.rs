//! State of the intake wizard: the record being filled in, the current step,
//! the debounced draft mirror and the final submission.

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

mod autosave;

pub use autosave::Debouncer;

use crate::api::{AnamneseBackend, ApiError};
use crate::record::{Anamnese, AnamneseDraft, RecordPatch};
use crate::session::DraftStore;

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Consentimento,
    Identificacao,
    Queixa,
    Hda,
    Interrogatorio,
    AntecedentesHabitos,
    PsicossocialRevisao,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::Consentimento,
        WizardStep::Identificacao,
        WizardStep::Queixa,
        WizardStep::Hda,
        WizardStep::Interrogatorio,
        WizardStep::AntecedentesHabitos,
        WizardStep::PsicossocialRevisao,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn id(&self) -> &'static str {
        match self {
            WizardStep::Consentimento => "consentimento",
            WizardStep::Identificacao => "identificacao",
            WizardStep::Queixa => "queixa",
            WizardStep::Hda => "hda",
            WizardStep::Interrogatorio => "is",
            WizardStep::AntecedentesHabitos => "antecedentes",
            WizardStep::PsicossocialRevisao => "psicossocial",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Consentimento => "Consentimento",
            WizardStep::Identificacao => "Identificação",
            WizardStep::Queixa => "Queixa Principal",
            WizardStep::Hda => "HDA",
            WizardStep::Interrogatorio => "Interrogatório Sistemático",
            WizardStep::AntecedentesHabitos => "Antecedentes & Hábitos",
            WizardStep::PsicossocialRevisao => "Psicossocial & Revisão",
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Save is only available on the last step")]
    NotLastStep,
    #[error("A save is already in progress")]
    InProgress,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Wizard {
    record: AnamneseDraft,
    step: usize,
    saving: bool,
    restored: bool,
    autosave: Debouncer,
    drafts: DraftStore,
}

impl Wizard {
    /// Start from the stored draft if there is one, else a fresh record
    pub fn open(drafts: DraftStore, autosave_delay: Duration) -> Self {
        let stored = match drafts.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Ignoring unreadable draft: {}", e);
                None
            }
        };
        let restored = stored.is_some();
        if restored {
            info!("Restored wizard draft");
        }

        Self {
            record: stored.unwrap_or_default(),
            step: 0,
            saving: false,
            restored,
            autosave: Debouncer::new(autosave_delay),
            drafts,
        }
    }

    pub fn record(&self) -> &AnamneseDraft {
        &self.record
    }

    pub fn was_restored(&self) -> bool {
        self.restored
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.step]
    }

    pub fn is_first(&self) -> bool {
        self.step == 0
    }

    pub fn is_last(&self) -> bool {
        self.step == WizardStep::COUNT - 1
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Percentage shown in the progress bar
    pub fn progress_percent(&self) -> u16 {
        // COUNT is a small constant; the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let percent = ((self.step + 1) * 100 / WizardStep::COUNT) as u16;
        percent
    }

    pub fn next(&mut self) {
        if !self.is_last() {
            self.step += 1;
        }
    }

    pub fn prev(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    /// Apply an edit and restart the autosave idle period
    pub fn merge(&mut self, patch: RecordPatch, now: Instant) {
        if patch.is_empty() {
            return;
        }
        debug!(sections = ?patch.sections(), "Wizard edit");
        self.record.merge(patch);
        self.autosave.touch(now);
    }

    /// Mirror the draft to disk if the idle period has elapsed.
    /// Returns whether a write happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.autosave.due(now) {
            return false;
        }
        match self.drafts.save(&self.record) {
            Ok(()) => {
                debug!("Draft autosaved");
                true
            }
            Err(e) => {
                warn!("Draft autosave failed: {}", e);
                false
            }
        }
    }

    /// Write a pending autosave now, e.g. when leaving the wizard
    pub fn flush(&mut self) {
        if !self.autosave.is_pending() {
            return;
        }
        self.autosave.cancel();
        if let Err(e) = self.drafts.save(&self.record) {
            warn!("Draft save on exit failed: {}", e);
        }
    }

    /// Submit the record.
    ///
    /// On success the stored draft is removed and the persisted record is
    /// returned. On failure nothing on disk changes.
    pub async fn save(&mut self, backend: &dyn AnamneseBackend) -> Result<Anamnese, SaveError> {
        if !self.is_last() {
            return Err(SaveError::NotLastStep);
        }
        if self.saving {
            return Err(SaveError::InProgress);
        }

        self.saving = true;
        let mut submission = self.record.clone();
        submission.refresh_derived();
        let result = backend.create_anamnese(&submission).await;
        self.saving = false;

        let saved = result?;
        self.record = submission;
        self.autosave.cancel();
        if let Err(e) = self.drafts.clear() {
            warn!("Record saved but draft could not be removed: {}", e);
        }
        info!(id = %saved.id, "Anamnese saved");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ExportFile, ExportFormat, SessionData, User};
    use crate::record::{Habitos, Identificacao, StatusTabagismo};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Backend double that records submissions and can be told to fail
    #[derive(Default)]
    struct RecordingBackend {
        fail: bool,
        submitted: Mutex<Vec<AnamneseDraft>>,
    }

    #[async_trait]
    impl AnamneseBackend for RecordingBackend {
        fn set_token(&mut self, _token: Option<String>) {}

        fn has_token(&self) -> bool {
            true
        }

        async fn exchange_session(&self, _session_id: &str) -> Result<SessionData, ApiError> {
            Err(ApiError::unauthorized("POST auth/session-data"))
        }

        async fn current_user(&self) -> Result<User, ApiError> {
            Err(ApiError::unauthorized("GET auth/me"))
        }

        async fn logout(&self) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_anamneses(&self, _search: Option<&str>) -> Result<Vec<Anamnese>, ApiError> {
            Ok(Vec::new())
        }

        async fn get_anamnese(&self, id: &str) -> Result<Anamnese, ApiError> {
            Err(ApiError::not_found(format!("GET anamneses/{}", id)))
        }

        async fn create_anamnese(&self, draft: &AnamneseDraft) -> Result<Anamnese, ApiError> {
            if self.fail {
                return Err(ApiError::http("POST anamneses", 500, "boom"));
            }
            self.submitted.lock().unwrap().push(draft.clone());
            Ok(Anamnese {
                id: "new-id".to_string(),
                user_id: "u1".to_string(),
                record: draft.clone(),
                auditoria: None,
                resumo_clinico_ia: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }

        async fn delete_anamnese(&self, _id: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn generate_summary(&self, _id: &str) -> Result<String, ApiError> {
            Ok(String::new())
        }

        async fn download_export(
            &self,
            id: &str,
            format: ExportFormat,
        ) -> Result<ExportFile, ApiError> {
            Ok(ExportFile {
                filename: format.default_filename(id),
                bytes: Vec::new(),
            })
        }
    }

    fn open(dir: &TempDir) -> Wizard {
        Wizard::open(DraftStore::new(dir.path()), Duration::from_millis(1000))
    }

    fn go_to_last(wizard: &mut Wizard) {
        for _ in 0..WizardStep::COUNT {
            wizard.next();
        }
    }

    #[test]
    fn test_step_index_is_clamped() {
        let dir = TempDir::new().unwrap();
        let mut wizard = open(&dir);

        wizard.prev();
        assert_eq!(wizard.step_index(), 0);

        for _ in 0..20 {
            wizard.next();
        }
        assert_eq!(wizard.step_index(), WizardStep::COUNT - 1);
        assert!(wizard.is_last());
        assert_eq!(wizard.current_step(), WizardStep::PsicossocialRevisao);
        assert_eq!(wizard.progress_percent(), 100);
    }

    #[test]
    fn test_fresh_wizard_without_draft() {
        let dir = TempDir::new().unwrap();
        let wizard = open(&dir);
        assert!(!wizard.was_restored());
        assert_eq!(wizard.record().identificacao, Identificacao::default());
    }

    #[test]
    fn test_wizard_restores_stored_draft() {
        let dir = TempDir::new().unwrap();
        let mut draft = AnamneseDraft::new();
        draft.identificacao.nome_completo = "Carlos".to_string();
        DraftStore::new(dir.path()).save(&draft).unwrap();

        let wizard = open(&dir);
        assert!(wizard.was_restored());
        assert_eq!(wizard.record(), &draft);
    }

    #[test]
    fn test_autosave_waits_for_idle_period() {
        let dir = TempDir::new().unwrap();
        let mut wizard = open(&dir);
        let start = Instant::now();

        let mut ident = wizard.record().identificacao.clone();
        ident.nome_completo = "Ana".to_string();
        wizard.merge(ident.into(), start);

        assert!(!wizard.tick(start + Duration::from_millis(500)));
        assert!(!DraftStore::new(dir.path()).exists());

        assert!(wizard.tick(start + Duration::from_millis(1000)));
        let stored = DraftStore::new(dir.path()).load().unwrap().unwrap();
        assert_eq!(stored.identificacao.nome_completo, "Ana");

        // Fires once per idle period
        assert!(!wizard.tick(start + Duration::from_millis(3000)));
    }

    #[test]
    fn test_flush_writes_pending_edit_once() {
        let dir = TempDir::new().unwrap();
        let mut wizard = open(&dir);
        let start = Instant::now();

        wizard.flush();
        assert!(!DraftStore::new(dir.path()).exists());

        let mut hda = wizard.record().hda.clone();
        hda.narrativa = "Febre há dois dias".to_string();
        wizard.merge(hda.into(), start);
        wizard.flush();

        let stored = DraftStore::new(dir.path()).load().unwrap().unwrap();
        assert_eq!(stored.hda.narrativa, "Febre há dois dias");
        assert!(!wizard.tick(start + Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_save_requires_last_step() {
        let dir = TempDir::new().unwrap();
        let mut wizard = open(&dir);
        let backend = RecordingBackend::default();

        let result = wizard.save(&backend).await;
        assert!(matches!(result, Err(SaveError::NotLastStep)));
        assert!(backend.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_computes_pack_years_and_clears_draft() {
        let dir = TempDir::new().unwrap();
        let mut wizard = open(&dir);
        let start = Instant::now();

        let mut habitos = Habitos::default();
        habitos.tabagismo.status = StatusTabagismo::Atual;
        habitos.tabagismo.macos_dia = 1.5;
        habitos.tabagismo.anos = 10;
        wizard.merge(habitos.into(), start);
        wizard.tick(start + Duration::from_secs(1));
        assert!(DraftStore::new(dir.path()).exists());

        go_to_last(&mut wizard);
        let backend = RecordingBackend::default();
        let saved = wizard.save(&backend).await.unwrap();

        assert_eq!(saved.id, "new-id");
        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted[0].habitos.tabagismo.carga_tabagica_packyears, 15.0);
        assert!(!DraftStore::new(dir.path()).exists());
        assert!(!wizard.is_saving());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_draft_untouched() {
        let dir = TempDir::new().unwrap();
        let mut wizard = open(&dir);
        let start = Instant::now();

        let mut ident = Identificacao::default();
        ident.nome_completo = "Beatriz".to_string();
        wizard.merge(ident.into(), start);
        wizard.tick(start + Duration::from_secs(1));
        let before = std::fs::read(DraftStore::new(dir.path()).path()).unwrap();

        go_to_last(&mut wizard);
        let backend = RecordingBackend {
            fail: true,
            ..RecordingBackend::default()
        };
        let result = wizard.save(&backend).await;

        assert!(matches!(result, Err(SaveError::Api(_))));
        let after = std::fs::read(DraftStore::new(dir.path()).path()).unwrap();
        assert_eq!(before, after);
        assert!(!wizard.is_saving());
        assert_eq!(wizard.record().identificacao.nome_completo, "Beatriz");
    }
}
