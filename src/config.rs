//! Configuration for figgen.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (FIGGEN_*)
//! 2. Config file (./figgen.yaml, then ~/.figgen/config.yaml)
//! 3. Defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::providers::RetryPolicy;

/// Resolved settings for the whole process
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Size of the worker pool (how many pipelines run concurrently)
    pub workers: usize,

    /// Number of reference examples retrieval returns (K)
    pub retrieval_examples: usize,

    /// Default maximum refinement rounds (request may override)
    pub max_rounds: u32,

    /// Path to the reference catalog index JSON
    pub reference_path: PathBuf,

    /// Directory generated artifacts are written to
    pub output_dir: PathBuf,

    /// Address the HTTP service binds to
    pub bind_addr: String,

    pub provider: ProviderSettings,

    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: 3,
            retrieval_examples: 10,
            max_rounds: 3,
            reference_path: PathBuf::from("data/reference/index.json"),
            output_dir: PathBuf::from("outputs"),
            bind_addr: "127.0.0.1:9000".to_string(),
            provider: ProviderSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the generateContent API
    pub base_url: String,

    /// Model used for text capabilities (rank, plan, style, critique)
    pub text_model: String,

    /// Model used for image rendering
    pub image_model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Overall deadline for a single provider call, in seconds
    pub call_timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            call_timeout_seconds: 120,
        }
    }
}

impl ProviderSettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay_ms,
            max_delay_ms: policy.max_delay_ms,
            backoff_multiplier: policy.backoff_multiplier,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay_ms: self.initial_delay_ms,
            max_delay_ms: self.max_delay_ms,
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

impl Settings {
    /// Load settings from an explicit file, a discovered file, or defaults,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.map(PathBuf::from).or_else(find_config_file);

        let mut settings = match &file {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {}", p.display()))?;
                serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", p.display()))?
            }
            None => Self::default(),
        };
        debug!(config_file = ?file, "configuration loaded");

        settings.apply_env();
        Ok(settings)
    }

    fn apply_env(&mut self) {
        if let Some(workers) = env_parse("FIGGEN_WORKERS") {
            self.workers = workers;
        }
        if let Some(rounds) = env_parse("FIGGEN_MAX_ROUNDS") {
            self.max_rounds = rounds;
        }
        if let Ok(path) = std::env::var("FIGGEN_REFERENCE_PATH") {
            self.reference_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("FIGGEN_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("FIGGEN_BIND_ADDR") {
            self.bind_addr = addr;
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Search ./figgen.yaml, then ~/.figgen/config.yaml
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("figgen.yaml");
    if local.exists() {
        return Some(local);
    }

    let home = dirs::home_dir()?.join(".figgen").join("config.yaml");
    home.exists().then_some(home)
}
