//! Application configuration for dmfinder.
//!
//! User config lives at `~/.dmfinder/dmfinder.toml` and is optional; every
//! key has a default. API keys are never stored in the file, only the names
//! of the environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DmfinderError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dmfinder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dmfinder";

// ---------------------------------------------------------------------------
// Config structs (matching dmfinder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Language-model provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Batch scheduling budget.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Search endpoint (Serper-compatible).
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Country code sent as `gl`.
    #[serde(default = "default_country")]
    pub country: String,

    /// Number of results requested per query (`num`).
    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,

    /// Hits per query kept in the summary handed to the model.
    #[serde(default = "default_hits_per_query")]
    pub hits_per_query: usize,

    /// Per-request deadline in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            endpoint: default_search_endpoint(),
            country: default_country(),
            results_per_query: default_results_per_query(),
            hits_per_query: default_hits_per_query(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_key_env() -> String {
    "SERPER_API_KEY".into()
}
fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".into()
}
fn default_country() -> String {
    "us".into()
}
fn default_results_per_query() -> u32 {
    10
}
fn default_hits_per_query() -> usize {
    4
}
fn default_search_timeout() -> u64 {
    30
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the LLM API key.
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint (OpenRouter-compatible).
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Max completion tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request deadline in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_key_env(),
            endpoint: default_llm_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_llm_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.1
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_llm_timeout() -> u64 {
    120
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sustained search requests the provider tolerates in flight.
    #[serde(default = "default_search_rate_limit")]
    pub search_rate_limit: usize,

    /// Explicit chunk size; derived from the rate limit when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            search_rate_limit: default_search_rate_limit(),
            chunk_size: None,
        }
    }
}

fn default_search_rate_limit() -> usize {
    70
}

impl SchedulerConfig {
    /// Companies per chunk, such that `chunk * queries_per_company` stays
    /// within the search rate limit. Never below one.
    pub fn chunk_size(&self, queries_per_company: usize) -> usize {
        match self.chunk_size {
            Some(size) => size.max(1),
            None => (self.search_rate_limit / queries_per_company.max(1)).max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials (resolved from the environment)
// ---------------------------------------------------------------------------

/// API keys for both providers, resolved once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub search_api_key: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both API keys from the env vars named in `config`.
    pub fn from_env(config: &AppConfig) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve both API keys through `lookup`. Missing or empty values are a
    /// config error naming every absent variable.
    pub fn resolve(config: &AppConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let fetch = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let search = fetch(&config.search.api_key_env);
        let llm = fetch(&config.llm.api_key_env);

        match (search, llm) {
            (Some(search_api_key), Some(llm_api_key)) => Ok(Self {
                search_api_key,
                llm_api_key,
            }),
            (search, llm) => {
                let missing: Vec<&str> = [
                    (search.is_none(), config.search.api_key_env.as_str()),
                    (llm.is_none(), config.llm.api_key_env.as_str()),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Err(DmfinderError::config(format!(
                    "missing API key(s): set {} in the environment or a .env file",
                    missing.join(" and ")
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dmfinder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DmfinderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dmfinder/dmfinder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DmfinderError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DmfinderError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DmfinderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DmfinderError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DmfinderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Load a `.env` file from the working directory, if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(?path, "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("SERPER_API_KEY"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
        assert!(toml_str.contains("openai/gpt-4o-mini"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.search.results_per_query, 10);
        assert_eq!(parsed.search.country, "us");
        assert_eq!(parsed.llm.max_tokens, 4000);
        assert!(parsed.scheduler.chunk_size.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[llm]
model = "anthropic/claude-3.5-haiku"

[scheduler]
chunk_size = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.llm.model, "anthropic/claude-3.5-haiku");
        assert_eq!(config.llm.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.search.hits_per_query, 4);
        assert_eq!(config.scheduler.chunk_size(5), 3);
    }

    #[test]
    fn chunk_size_derived_from_rate_limit() {
        let scheduler = SchedulerConfig::default();
        assert_eq!(scheduler.chunk_size(5), 14);

        let tight = SchedulerConfig {
            search_rate_limit: 3,
            chunk_size: None,
        };
        assert_eq!(tight.chunk_size(5), 1);
        assert_eq!(tight.chunk_size(0), 3);
    }

    #[test]
    fn credentials_resolve_both_keys() {
        let config = AppConfig::default();
        let creds = Credentials::resolve(&config, |name| match name {
            "SERPER_API_KEY" => Some("serper-key".into()),
            "OPENROUTER_API_KEY" => Some("or-key".into()),
            _ => None,
        })
        .expect("resolve");
        assert_eq!(creds.search_api_key, "serper-key");
        assert_eq!(creds.llm_api_key, "or-key");
        assert!(!format!("{creds:?}").contains("serper-key"));
    }

    #[test]
    fn credentials_missing_key_names_variable() {
        let config = AppConfig::default();
        let err = Credentials::resolve(&config, |name| {
            (name == "SERPER_API_KEY").then(|| "serper-key".to_string())
        })
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OPENROUTER_API_KEY"));
        assert!(!msg.contains("SERPER_API_KEY"));
    }

    #[test]
    fn credentials_reject_blank_values() {
        let config = AppConfig::default();
        let err = Credentials::resolve(&config, |_| Some("   ".into())).unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY and OPENROUTER_API_KEY"));
    }

    #[test]
    fn from_env_with_unset_vars_fails() {
        let mut config = AppConfig::default();
        // Unique names so the test never sees a developer's real keys
        config.search.api_key_env = "DMF_TEST_NONEXISTENT_SEARCH_KEY_12345".into();
        config.llm.api_key_env = "DMF_TEST_NONEXISTENT_LLM_KEY_12345".into();
        let result = Credentials::from_env(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing API key"));
    }
}
