use std::path::{Path, PathBuf};

use super::{read_optional, remove_file, write_file, StoreError, DRAFT_FILE};
use crate::record::AnamneseDraft;

/// Mirror of the in-progress wizard record
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(DRAFT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Option<AnamneseDraft>, StoreError> {
        let Some(contents) = read_optional(&self.path)? else {
            return Ok(None);
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::corrupt(&self.path, e))
    }

    pub fn save(&self, draft: &AnamneseDraft) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(draft).map_err(|e| StoreError::corrupt(&self.path, e))?;
        write_file(&self.path, &json)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        remove_file(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GrauConfiabilidade, StatusTabagismo};
    use tempfile::TempDir;

    #[test]
    fn test_load_without_draft() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
        assert!(!store.exists());
    }

    #[test]
    fn test_saved_draft_reloads_identical() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::new(dir.path());

        let mut draft = AnamneseDraft::new();
        draft.meta.consentimento = true;
        draft.identificacao.nome_completo = "Maria da Silva".to_string();
        draft.identificacao.grau_confiabilidade = GrauConfiabilidade::Otimo;
        draft.habitos.tabagismo.status = StatusTabagismo::Ex;
        draft.habitos.tabagismo.macos_dia = 0.5;
        draft.interrogatorio_sistematico.pele.pergunta_guarda_chuva = "Nega".to_string();

        store.save(&draft).unwrap();
        assert_eq!(store.load().unwrap(), Some(draft));
    }

    #[test]
    fn test_save_creates_state_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = DraftStore::new(&nested);
        store.save(&AnamneseDraft::new()).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_clear_removes_draft() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::new(dir.path());
        store.save(&AnamneseDraft::new()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_draft_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::new(dir.path());
        std::fs::write(store.path(), "{\"meta\": ").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }
}
