//! Configuration loading, validation, and management for wordsplit.
//!
//! Loads configuration from `~/.wordsplit/config.toml`, then applies
//! environment variable overrides. The variable names match the ones the
//! service has always been deployed with (`SECRET_KEY`, `API_PREFIX`,
//! `AzureKeyVault__Dns`, ...). Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use wordsplit_core::Language;

/// The root configuration structure.
///
/// Maps directly to `~/.wordsplit/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name used in the welcome message
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Version reported by the info endpoints
    #[serde(default = "default_version")]
    pub version: String,

    /// Debug mode (raises the default log level)
    #[serde(default)]
    pub debug: bool,

    /// Prefix all API routes are nested under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Segmentation model configuration
    #[serde(default)]
    pub models: ModelsConfig,

    /// Per-language acronym overrides (language code → words)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub acronyms: HashMap<String, Vec<String>>,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Azure Key Vault configuration
    #[serde(default)]
    pub key_vault: KeyVaultConfig,
}

fn default_project_name() -> String {
    "Word Segmentation API".into()
}
fn default_version() -> String {
    "1.0.0".into()
}
fn default_api_prefix() -> String {
    "/api/v1".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("project_name", &self.project_name)
            .field("version", &self.version)
            .field("debug", &self.debug)
            .field("api_prefix", &self.api_prefix)
            .field("server", &self.server)
            .field("models", &self.models)
            .field("acronyms", &self.acronyms)
            .field("auth", &self.auth)
            .field("key_vault", &self.key_vault)
            .finish()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &redact(&self.secret_key))
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("require_token", &self.require_token)
            .finish()
    }
}

impl std::fmt::Debug for KeyVaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVaultConfig")
            .field("dns", &self.dns)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("secret_key_name", &self.secret_key_name)
            .field("authority_host", &self.authority_host)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. `["*"]` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Whether CORS is wide open.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory model artifacts are resolved against
    /// (default: `~/.wordsplit/models`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Load every language model at startup instead of on first request
    #[serde(default)]
    pub eager_load: bool,

    /// Per-language model overrides (language code → model)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub languages: HashMap<String, LanguageModelConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageModelConfig {
    /// Model name, resolved as `<dir>/<model>/tokenizer.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Explicit path to a `tokenizer.json`; wins over `model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing key for access tokens. Empty = fetch from Key Vault
    /// or generate one per process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default = "default_token_expire_minutes")]
    pub access_token_expire_minutes: u64,

    /// Require a bearer token on the segmentation routes
    #[serde(default)]
    pub require_token: bool,
}

fn default_token_expire_minutes() -> u64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            access_token_expire_minutes: default_token_expire_minutes(),
            require_token: false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct KeyVaultConfig {
    /// Vault URL, e.g. `https://my-vault.vault.azure.net/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Secret holding the token signing key
    #[serde(default = "default_secret_key_name")]
    pub secret_key_name: String,

    /// OAuth2 authority the client-credentials token is requested from
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
}

fn default_secret_key_name() -> String {
    "SecretKey".into()
}
fn default_authority_host() -> String {
    "https://login.microsoftonline.com".into()
}

impl Default for KeyVaultConfig {
    fn default() -> Self {
        Self {
            dns: None,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            secret_key_name: default_secret_key_name(),
            authority_host: default_authority_host(),
        }
    }
}

impl KeyVaultConfig {
    /// A vault URL has been set (credentials are checked by `validate`).
    pub fn is_configured(&self) -> bool {
        self.dns.as_deref().is_some_and(|d| !d.trim().is_empty())
    }
}

/// Environment variables consulted by [`AppConfig::apply_env_overrides`].
pub const ENV_OVERRIDES: &[&str] = &[
    "PROJECT_NAME",
    "VERSION",
    "DEBUG",
    "API_PREFIX",
    "SECRET_KEY",
    "ACCESS_TOKEN_EXPIRE_MINUTES",
    "AzureKeyVault__Dns",
    "AzureKeyVault__ClientId",
    "AzureKeyVault__ClientSecret",
    "AzureKeyVault__TenantId",
    "WORDSPLIT_HOST",
    "WORDSPLIT_PORT",
    "WORDSPLIT_MODELS_DIR",
];

impl AppConfig {
    /// Load configuration from the default path (~/.wordsplit/config.toml)
    /// and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("PROJECT_NAME") {
            self.project_name = v;
        }
        if let Some(v) = get("VERSION") {
            self.version = v;
        }
        if let Some(v) = get("DEBUG") {
            self.debug = parse_bool("DEBUG", &v)?;
        }
        if let Some(v) = get("API_PREFIX") {
            self.api_prefix = v;
        }
        if let Some(v) = get("SECRET_KEY") {
            self.auth.secret_key = Some(v);
        }
        if let Some(v) = get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.auth.access_token_expire_minutes =
                v.trim().parse().map_err(|_| ConfigError::EnvError {
                    key: "ACCESS_TOKEN_EXPIRE_MINUTES".into(),
                    reason: format!("expected a whole number of minutes, got '{v}'"),
                })?;
        }
        if let Some(v) = get("AzureKeyVault__Dns") {
            self.key_vault.dns = Some(v);
        }
        if let Some(v) = get("AzureKeyVault__ClientId") {
            self.key_vault.client_id = Some(v);
        }
        if let Some(v) = get("AzureKeyVault__ClientSecret") {
            self.key_vault.client_secret = Some(v);
        }
        if let Some(v) = get("AzureKeyVault__TenantId") {
            self.key_vault.tenant_id = Some(v);
        }
        if let Some(v) = get("WORDSPLIT_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("WORDSPLIT_PORT") {
            self.server.port = v.trim().parse().map_err(|_| ConfigError::EnvError {
                key: "WORDSPLIT_PORT".into(),
                reason: format!("expected a port number, got '{v}'"),
            })?;
        }
        if let Some(v) = get("WORDSPLIT_MODELS_DIR") {
            self.models.dir = Some(v);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".wordsplit")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory model artifacts are resolved against.
    pub fn models_dir(&self) -> PathBuf {
        match &self.models.dir {
            Some(dir) => PathBuf::from(dir),
            None => Self::config_dir().join("models"),
        }
    }

    /// Model name and optional explicit artifact path for a language.
    pub fn model_for(&self, language: Language) -> (String, Option<PathBuf>) {
        let overrides = self.models.languages.get(language.code());
        let model = overrides
            .and_then(|o| o.model.clone())
            .unwrap_or_else(|| language.default_model().to_string());
        let path = overrides.and_then(|o| o.path.as_ref()).map(PathBuf::from);
        (model, path)
    }

    /// Acronym list for a language: the configured override or the built-in list.
    pub fn acronyms_for(&self, language: Language) -> Vec<String> {
        match self.acronyms.get(language.code()) {
            Some(words) => words.clone(),
            None => language
                .default_acronyms()
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_prefix.starts_with('/') || (self.api_prefix.len() > 1 && self.api_prefix.ends_with('/')) {
            return Err(ConfigError::ValidationError(format!(
                "api_prefix must start with '/' and must not end with '/': '{}'",
                self.api_prefix
            )));
        }

        if self.auth.access_token_expire_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "auth.access_token_expire_minutes must be > 0".into(),
            ));
        }

        if self.server.cors_origins.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.cors_origins must list at least one origin (use \"*\" for any)".into(),
            ));
        }

        for code in self.acronyms.keys().chain(self.models.languages.keys()) {
            if Language::parse(code).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "unsupported language '{code}' in config (expected one of: pt, en)"
                )));
            }
        }

        if self.key_vault.is_configured() {
            let dns = self.key_vault.dns.as_deref().unwrap_or_default();
            if !dns.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "key_vault.dns must be an https URL: '{dns}'"
                )));
            }
            let missing: Vec<&str> = [
                ("tenant_id", &self.key_vault.tenant_id),
                ("client_id", &self.key_vault.client_id),
                ("client_secret", &self.key_vault.client_secret),
            ]
            .iter()
            .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
            if !missing.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "key_vault.dns is set but {} missing",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            version: default_version(),
            debug: false,
            api_prefix: default_api_prefix(),
            server: ServerConfig::default(),
            models: ModelsConfig::default(),
            acronyms: HashMap::new(),
            auth: AuthConfig::default(),
            key_vault: KeyVaultConfig::default(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::EnvError {
            key: key.into(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid environment variable {key}: {reason}")]
    EnvError { key: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
