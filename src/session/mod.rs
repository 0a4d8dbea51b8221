//! Local persistence: the session token and the unsaved wizard draft.
//!
//! Both live as JSON files in the state directory. Nothing else is kept on
//! disk; persisted records belong to the backend.

use std::path::PathBuf;
use thiserror::Error;

mod draft;
mod token;

pub use draft::DraftStore;
pub use token::{SessionStore, StoredSession};

/// File name of the stored session token
pub const SESSION_FILE: &str = "session.json";
/// File name of the unsaved wizard draft
pub const DRAFT_FILE: &str = "anamnese_draft.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Corrupt {
            path: path.into(),
            source,
        }
    }
}

/// Read a file, treating a missing file as `None`
fn read_optional(path: &std::path::Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

fn write_file(path: &std::path::Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| StoreError::io(path, e))
}

/// Remove a file; removing a file that does not exist is not an error
fn remove_file(path: &std::path::Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
