//! Client side of the anamnese backend.
//!
//! [`AnamneseBackend`] is the seam the rest of the crate talks to;
//! [`HttpBackend`] is the reqwest implementation used at runtime.

pub mod error;
mod http;

pub use error::ApiError;
pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::record::{Anamnese, AnamneseDraft};

/// Authenticated user as returned by `auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Reply of `auth/session-data`: the user plus the issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: String,
}

impl SessionData {
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
        }
    }

    /// Name the backend uses in its `Content-Disposition` header
    pub fn default_filename(&self, id: &str) -> String {
        format!("anamnese_{}.{}", id, self.extension())
    }
}

/// A downloaded export, ready to be written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Operations the client needs from the backend.
///
/// Implementations carry the session token themselves; callers set it once
/// after login or bootstrap with [`AnamneseBackend::set_token`].
#[async_trait]
pub trait AnamneseBackend: Send + Sync {
    fn set_token(&mut self, token: Option<String>);

    fn has_token(&self) -> bool;

    /// Trade an identity-provider session id for a backend session
    async fn exchange_session(&self, session_id: &str) -> Result<SessionData, ApiError>;

    async fn current_user(&self) -> Result<User, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    /// List the user's records; a blank search term lists everything
    async fn list_anamneses(&self, search: Option<&str>) -> Result<Vec<Anamnese>, ApiError>;

    async fn get_anamnese(&self, id: &str) -> Result<Anamnese, ApiError>;

    async fn create_anamnese(&self, draft: &AnamneseDraft) -> Result<Anamnese, ApiError>;

    async fn delete_anamnese(&self, id: &str) -> Result<(), ApiError>;

    /// Ask the backend to (re)generate the clinical summary; returns the text
    async fn generate_summary(&self, id: &str) -> Result<String, ApiError>;

    async fn download_export(&self, id: &str, format: ExportFormat)
        -> Result<ExportFile, ApiError>;
}
