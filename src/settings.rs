//! Configuration from the environment and provider resolution.
//!
//! Sources, in order: process environment, then `.env.local` / `.env` in the
//! working directory (first file found wins; existing variables are never
//! overridden).
//!
//! Provider priority:
//! 1. LLM_PROVIDER (explicit override)
//! 2. First provider with an API key set (anthropic, openai, groq, gemini)

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::file_store::default_history_path;
use crate::llm::{ClientConfig, Provider, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::prompts::{CatalogError, PromptCatalog};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("no AI provider configured: set one of ANTHROPIC_API_KEY, OPENAI_API_KEY, GROQ_API_KEY, GEMINI_API_KEY")]
    NoProvider,
    #[error("{provider} selected but {} is not set", provider.env_key())]
    MissingApiKey { provider: Provider },
    #[error("failed to load {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },
}

#[derive(Clone)]
pub struct Settings {
    /// Explicit provider from LLM_PROVIDER.
    pub provider: Option<Provider>,
    api_keys: Vec<(Provider, String)>,
    pub model: Option<String>,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub history_path: PathBuf,
    pub prompts_path: Option<PathBuf>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let configured: Vec<Provider> = self.api_keys.iter().map(|(p, _)| *p).collect();
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("api_keys_for", &configured)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("history_path", &self.history_path)
            .field("prompts_path", &self.prompts_path)
            .finish()
    }
}

/// Load `.env.local` → `.env` from `dir`. Returns the file that was loaded.
///
/// Runs before the logger exists, so the caller reports the result.
pub fn load_env_files(dir: &Path) -> Result<Option<PathBuf>, SettingsError> {
    for env_file in [".env.local", ".env"] {
        let path = dir.join(env_file);
        if path.exists() {
            dotenvy::from_path(&path).map_err(|e| SettingsError::EnvFile {
                path: path.clone(),
                message: e.to_string(),
            })?;
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn parse_var<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
    valid: impl Fn(&T) -> bool,
    expected: &str,
) -> Result<T, SettingsError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.parse::<T>() {
        Ok(parsed) if valid(&parsed) => Ok(parsed),
        _ => Err(SettingsError::InvalidValue {
            key,
            value,
            reason: expected.to_string(),
        }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key → value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => Some(raw.parse::<Provider>().map_err(|reason| SettingsError::InvalidValue {
                key: "LLM_PROVIDER",
                value: raw.clone(),
                reason,
            })?),
            None => None,
        };

        let api_keys = Provider::ALL
            .iter()
            .filter_map(|p| get(p.env_key()).map(|key| (*p, key)))
            .collect();

        let timeout_secs = parse_var(
            "CLIPBOARD_AI_TIMEOUT_SECS",
            get("CLIPBOARD_AI_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
            |s| *s > 0,
            "expected a positive number of seconds",
        )?;
        let max_tokens = parse_var(
            "CLIPBOARD_AI_MAX_TOKENS",
            get("CLIPBOARD_AI_MAX_TOKENS"),
            DEFAULT_MAX_TOKENS,
            |n| *n > 0,
            "expected a positive integer",
        )?;
        let temperature = parse_var(
            "CLIPBOARD_AI_TEMPERATURE",
            get("CLIPBOARD_AI_TEMPERATURE"),
            DEFAULT_TEMPERATURE,
            |t| (0.0..=2.0).contains(t),
            "expected a number between 0 and 2",
        )?;

        Ok(Self {
            provider,
            api_keys,
            model: get("CLIPBOARD_AI_MODEL"),
            timeout: Duration::from_secs(timeout_secs),
            max_tokens,
            temperature,
            history_path: get("CLIPBOARD_AI_HISTORY")
                .map(PathBuf::from)
                .unwrap_or_else(default_history_path),
            prompts_path: get("CLIPBOARD_AI_PROMPTS").map(PathBuf::from),
        })
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.api_keys
            .iter()
            .find(|(p, _)| *p == provider)
            .map(|(_, key)| key.as_str())
    }

    /// Determine which provider to use.
    pub fn resolve_provider(&self) -> Result<Provider, SettingsError> {
        if let Some(p) = self.provider {
            log::info!("[SETTINGS] Provider override: {}", p);
            return Ok(p);
        }
        self.api_keys
            .first()
            .map(|(p, _)| *p)
            .ok_or(SettingsError::NoProvider)
    }

    /// Client configuration for the resolved provider.
    pub fn client_config(&self) -> Result<ClientConfig, SettingsError> {
        let provider = self.resolve_provider()?;
        let api_key = self
            .api_key(provider)
            .ok_or(SettingsError::MissingApiKey { provider })?;
        let mut config = ClientConfig::new(provider, api_key);
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        config.max_tokens = self.max_tokens;
        config.temperature = self.temperature;
        Ok(config)
    }

    /// Built-in prompt catalog with the optional override file merged on top.
    pub fn prompt_catalog(&self) -> Result<PromptCatalog, CatalogError> {
        let mut catalog = PromptCatalog::builtin();
        if let Some(path) = &self.prompts_path {
            catalog.merge(PromptCatalog::load(path)?);
        }
        Ok(catalog)
    }
}
