use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable carrying the backend base URL in deployments
pub const BACKEND_URL_ENV: &str = "ANAMNESE_BACKEND_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without the `/api` suffix
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// External identity provider login page
    pub provider_url: String,
    /// Where the provider sends the browser back to (carries `#session_id=`)
    pub redirect_url: String,
    /// Lifetime of the stored session token in days (default: 7)
    #[serde(default = "default_session_max_age_days")]
    pub session_max_age_days: i64,
}

fn default_session_max_age_days() -> i64 {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Session token, draft and logs live here
    pub state: String,
    /// Downloaded PDF/JSON exports
    pub exports: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Idle time before the draft is mirrored to disk (default: 1000)
    #[serde(default = "default_autosave_debounce")]
    pub autosave_debounce_ms: u64,
}

fn default_autosave_debounce() -> u64 {
    1000
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: default_autosave_debounce(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    /// How long transient notifications stay on screen (default: 4)
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
}

fn default_toast_secs() -> u64 {
    4
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// User config file in ~/.config/anamnese/
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("anamnese").join("config.toml"))
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the client works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with ANAMNESE_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("ANAMNESE")
                .separator("__")
                .try_parsing(true),
        );

        let built = builder.build().context("Failed to load configuration")?;
        let mut config: Config = built
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        Ok(config)
    }

    /// Write this configuration to the user config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path =
            Self::user_config_path().context("No config directory on this platform")?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str = self.to_toml()?;
        std::fs::write(&config_path, toml_str).context("Failed to write config file")?;

        Ok(config_path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// `{base_url}/api`
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api.base_url.trim_end_matches('/'))
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        absolute(&self.paths.state)
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn exports_path(&self) -> PathBuf {
        absolute(&self.paths.exports)
    }
}

fn absolute(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

fn default_state_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("anamnese").to_string_lossy().to_string())
        .unwrap_or_else(|| ".anamnese".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8001".to_string(),
            },
            auth: AuthConfig {
                provider_url: "https://auth.emergentagent.com/".to_string(),
                redirect_url: "http://localhost:3000/".to_string(),
                session_max_age_days: default_session_max_age_days(),
            },
            paths: PathsConfig {
                state: default_state_dir(),
                exports: ".".to_string(), // Relative to cwd
            },
            wizard: WizardConfig::default(),
            ui: UiConfig {
                refresh_rate_ms: 250,
                toast_secs: default_toast_secs(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wizard.autosave_debounce_ms, 1000);
        assert_eq!(config.auth.session_max_age_days, 7);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_api_root_strips_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "https://clinic.example.com/".to_string();
        assert_eq!(config.api_root(), "https://clinic.example.com/api");
    }

    #[test]
    fn test_relative_state_path_is_made_absolute() {
        let mut config = Config::default();
        config.paths.state = "state-dir".to_string();
        assert!(config.state_path().is_absolute());
        assert!(config.logs_path().ends_with("state-dir/logs"));
    }

    #[test]
    fn test_toml_serialization_contains_sections() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[api]"));
        assert!(toml.contains("[wizard]"));
        assert!(toml.contains("autosave_debounce_ms = 1000"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://backend.test\"\n\n[ui]\nrefresh_rate_ms = 100\n",
        )
        .unwrap();

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        if std::env::var(BACKEND_URL_ENV).is_err() {
            assert_eq!(config.api.base_url, "https://backend.test");
        }
        assert_eq!(config.ui.refresh_rate_ms, 100);
        // Untouched sections keep their defaults
        assert_eq!(config.wizard.autosave_debounce_ms, 1000);
    }
}
