//! reqwest implementation of [`AnamneseBackend`]

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AnamneseBackend, ApiError, ExportFile, ExportFormat, SessionData, User};
use crate::config::Config;
use crate::record::{Anamnese, AnamneseDraft};

pub struct HttpBackend {
    api_root: String,
    token: Option<String>,
    client: Client,
}

impl HttpBackend {
    /// `api_root` is `{base_url}/api`
    pub fn new(api_root: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into().trim_end_matches('/').to_string(),
            token: None,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_root())
    }

    /// Join path segments onto the API root, escaping each one
    fn url(&self, segments: &[&str]) -> String {
        let joined = || format!("{}/{}", self.api_root, segments.join("/"));
        let Ok(mut url) = Url::parse(&self.api_root) else {
            return joined();
        };
        match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().extend(segments);
            }
            Err(()) => return joined(),
        }
        url.to_string()
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.url(segments));
        match &self.token {
            Some(token) => builder.header(header::COOKIE, format!("session_token={}", token)),
            None => builder,
        }
    }

    /// Send and turn any non-success status into an [`ApiError`]
    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        debug!(endpoint, "Backend request");

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(endpoint, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "Backend request failed");
            return Err(ApiError::from_status(endpoint, status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(endpoint, builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(endpoint, e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(endpoint, e.to_string()))
    }
}

#[derive(Deserialize)]
struct SummaryResponse {
    resumo_clinico: String,
}

/// Pull `filename=...` out of a `Content-Disposition` header
fn disposition_filename(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    })
}

#[async_trait]
impl AnamneseBackend for HttpBackend {
    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn exchange_session(&self, session_id: &str) -> Result<SessionData, ApiError> {
        let builder = self
            .request(Method::POST, &["auth", "session-data"])
            .header("X-Session-ID", session_id);
        self.json("POST auth/session-data", builder).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let builder = self.request(Method::GET, &["auth", "me"]);
        self.json("GET auth/me", builder).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, &["auth", "logout"]);
        self.send("POST auth/logout", builder).await?;
        Ok(())
    }

    async fn list_anamneses(&self, search: Option<&str>) -> Result<Vec<Anamnese>, ApiError> {
        let mut builder = self.request(Method::GET, &["anamneses"]);
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            builder = builder.query(&[("search", term)]);
        }
        self.json("GET anamneses", builder).await
    }

    async fn get_anamnese(&self, id: &str) -> Result<Anamnese, ApiError> {
        let builder = self.request(Method::GET, &["anamneses", id]);
        self.json(&format!("GET anamneses/{}", id), builder).await
    }

    async fn create_anamnese(&self, draft: &AnamneseDraft) -> Result<Anamnese, ApiError> {
        let builder = self.request(Method::POST, &["anamneses"]).json(draft);
        self.json("POST anamneses", builder).await
    }

    async fn delete_anamnese(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &["anamneses", id]);
        self.send(&format!("DELETE anamneses/{}", id), builder)
            .await?;
        Ok(())
    }

    async fn generate_summary(&self, id: &str) -> Result<String, ApiError> {
        let builder = self.request(Method::POST, &["anamneses", id, "generate-summary"]);
        let endpoint = format!("POST anamneses/{}/generate-summary", id);
        let reply: SummaryResponse = self.json(&endpoint, builder).await?;
        Ok(reply.resumo_clinico)
    }

    async fn download_export(
        &self,
        id: &str,
        format: ExportFormat,
    ) -> Result<ExportFile, ApiError> {
        let endpoint = format!("GET anamneses/{}/{}", id, format.extension());
        let builder = self.request(Method::GET, &["anamneses", id, format.extension()]);
        let response = self.send(&endpoint, builder).await?;

        let filename = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| format.default_filename(id));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(&endpoint, e.to_string()))?;

        Ok(ExportFile {
            filename,
            bytes: bytes.to_vec(),
        })
    }
}
