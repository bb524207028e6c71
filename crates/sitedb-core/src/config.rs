//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nesting, e.g. `APP_RETRIEVAL__THRESHOLD=0.5`). Typed
//! [`Settings`] are extracted on top of built-in defaults, so every key is
//! optional. Also provides helpers to expand `~` and `${VAR}` and to resolve
//! relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Upper bound on `generation.max_retries`. Backoff doubles per retry, so
/// the last allowed wait is about 2^9 seconds.
pub const MAX_GENERATION_RETRIES: u32 = 10;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Build from an explicit figment, e.g. an inline TOML string in tests.
    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings: defaults overlaid with whatever the sources provide.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(self.figment.clone())
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub retrieval: RetrievalSettings,
    pub context: ContextSettings,
    pub generation: GenerationSettings,
    pub embedding: EmbeddingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        let r = &self.retrieval;
        if !(-1.0..=1.0).contains(&r.threshold) {
            return Err(Error::InvalidConfig(format!("retrieval.threshold must be within [-1, 1], got {}", r.threshold)));
        }
        if r.result_limit == 0 || r.candidate_limit == 0 {
            return Err(Error::InvalidConfig("retrieval limits must be positive".into()));
        }
        if r.hybrid_boost_scale < 0.0 || r.rerank_boost_scale < 0.0 {
            return Err(Error::InvalidConfig("boost scales must not be negative".into()));
        }
        if self.generation.max_retries > MAX_GENERATION_RETRIES {
            return Err(Error::InvalidConfig(format!(
                "generation.max_retries must be at most {MAX_GENERATION_RETRIES}, got {}",
                self.generation.max_retries
            )));
        }
        if self.context.budget_tokens == 0 {
            return Err(Error::InvalidConfig("context.budget_tokens must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub dir: String,
    pub projects_file: String,
    pub awards_file: String,
    pub embeddings_file: String,
    pub use_cached_embeddings: bool,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: "data".into(),
            projects_file: "projects.json".into(),
            awards_file: "awards.json".into(),
            embeddings_file: "local_embeddings.json".into(),
            use_cached_embeddings: true,
        }
    }
}

impl DataSettings {
    pub fn dir_path(&self) -> PathBuf { expand_path(&self.dir) }
    pub fn projects_path(&self) -> PathBuf { resolve_with_base(&self.dir_path(), &self.projects_file) }
    pub fn awards_path(&self) -> PathBuf { resolve_with_base(&self.dir_path(), &self.awards_file) }
    pub fn embeddings_path(&self) -> PathBuf { resolve_with_base(&self.dir_path(), &self.embeddings_file) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Minimum cosine similarity for a vector candidate.
    pub threshold: f32,
    /// Vector candidates fetched before keyword merge and re-ranking.
    pub candidate_limit: usize,
    /// Results kept after re-ranking.
    pub result_limit: usize,
    pub hybrid_boost_scale: f32,
    pub rerank_boost_scale: f32,
    /// Upper bound on retrieval (including the query embedding) per request.
    pub deadline_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            candidate_limit: 15,
            result_limit: 10,
            hybrid_boost_scale: 0.05,
            rerank_boost_scale: 0.1,
            deadline_secs: 30,
        }
    }
}

impl RetrievalSettings {
    pub fn deadline(&self) -> Duration { Duration::from_secs(self.deadline_secs) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    pub budget_tokens: usize,
}

impl Default for ContextSettings {
    fn default() -> Self { Self { budget_tokens: 3500 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_retries: u32,
    pub attempt_timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Organization the agents speak for in their prompts.
    pub company: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.2,
            max_retries: 2,
            attempt_timeout_secs: 60,
            api_key_env: "OPENAI_API_KEY".into(),
            company: "Sundt Construction".into(),
        }
    }
}

impl GenerationSettings {
    pub fn attempt_timeout(&self) -> Duration { Duration::from_secs(self.attempt_timeout_secs) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<String>,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self { Self { model_dir: None, max_len: 256 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
