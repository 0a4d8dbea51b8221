//! Login relay to the external identity provider.
//!
//! The provider redirects the browser back with `#session_id=...` in the URL
//! fragment. In the terminal the user pastes that URL; the id is traded for
//! a backend session token, which is kept in the [`SessionStore`].

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::api::{AnamneseBackend, User};
use crate::config::Config;
use crate::session::SessionStore;

const SESSION_ID_PARAM: &str = "session_id";

/// Who is logged in, and whether that is still being worked out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthContext {
    pub fn pending() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Extract the `session_id` parameter from the fragment of a location.
///
/// Accepts a full URL (`https://app/#session_id=abc&x=1`) or a bare
/// fragment (`#session_id=abc`).
pub fn session_id_from_location(location: &str) -> Option<String> {
    let (_, fragment) = location.split_once('#')?;
    fragment
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SESSION_ID_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The location with its fragment removed
pub fn strip_fragment(location: &str) -> &str {
    location
        .split_once('#')
        .map_or(location, |(before, _)| before)
}

pub struct AuthRelay {
    sessions: SessionStore,
    provider_url: String,
    redirect_url: String,
}

impl AuthRelay {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: SessionStore::new(&config.state_path(), config.auth.session_max_age_days),
            provider_url: config.auth.provider_url.clone(),
            redirect_url: config.auth.redirect_url.clone(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Provider login page with our return address as `redirect`
    pub fn login_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.provider_url)
            .with_context(|| format!("Invalid auth provider URL: {}", self.provider_url))?;
        url.query_pairs_mut()
            .append_pair("redirect", &self.redirect_url);
        Ok(url.to_string())
    }

    /// Resolve the current user.
    ///
    /// With a `session_id` in `location` the id is exchanged for a new token;
    /// otherwise the stored token is checked against `auth/me`. Every failure
    /// resolves to an anonymous context.
    pub async fn bootstrap(
        &self,
        backend: &mut dyn AnamneseBackend,
        location: Option<&str>,
    ) -> AuthContext {
        if let Some(session_id) = location.and_then(session_id_from_location) {
            return self.exchange(backend, &session_id).await;
        }

        let token = match self.sessions.token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read stored session: {}", e);
                None
            }
        };
        let Some(token) = token else {
            debug!("No stored session");
            return AuthContext::anonymous();
        };

        backend.set_token(Some(token));
        match backend.current_user().await {
            Ok(user) => {
                info!(user = %user.email, "Session restored");
                AuthContext::signed_in(user)
            }
            Err(e) => {
                debug!("No active session: {}", e);
                backend.set_token(None);
                AuthContext::anonymous()
            }
        }
    }

    async fn exchange(&self, backend: &mut dyn AnamneseBackend, session_id: &str) -> AuthContext {
        let data = match backend.exchange_session(session_id).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Session exchange failed: {}", e);
                return AuthContext::anonymous();
            }
        };

        if let Err(e) = self.sessions.store(&data.session_token, Utc::now()) {
            warn!("Could not persist session token: {}", e);
        }
        backend.set_token(Some(data.session_token.clone()));
        info!(user = %data.email, "Logged in");
        AuthContext::signed_in(data.user())
    }

    /// End the session on the backend and forget the local token.
    ///
    /// The local token is cleared even when the backend call fails.
    pub async fn logout(&self, backend: &mut dyn AnamneseBackend, context: &mut AuthContext) {
        if let Err(e) = backend.logout().await {
            warn!("Backend logout failed: {}", e);
        }
        if let Err(e) = self.sessions.clear() {
            warn!("Could not remove stored session: {}", e);
        }
        backend.set_token(None);
        *context = AuthContext::anonymous();
        info!("Logged out");
    }
}
