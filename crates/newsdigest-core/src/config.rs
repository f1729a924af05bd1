use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::news::{Category, Country, HeadlineQuery, PageSize};

/// Environment variables checked (in order) for the news API key
pub const API_KEY_ENV_VARS: &[&str] = &["NEWSDIGEST_NEWS_API_KEY", "NEWS_API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level, used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// News API key; environment variables take precedence
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the NewsAPI-compatible service
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (0 = no timeout)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Country preselected in the session
    #[serde(default = "default_country")]
    pub default_country: Country,
    /// Category preselected in the session
    #[serde(default = "default_category")]
    pub default_category: Category,
    /// Article count preselected in the session
    #[serde(default)]
    pub default_page_size: PageSize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_news_base_url(),
            request_timeout_secs: default_timeout(),
            default_country: default_country(),
            default_category: default_category(),
            default_page_size: PageSize::default(),
        }
    }
}

impl NewsConfig {
    /// API key from the environment, falling back to the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    /// The selection a session starts with
    pub fn default_query(&self) -> HeadlineQuery {
        HeadlineQuery::new(self.default_country, self.default_category, self.default_page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Hugging Face hub model id of a T5-family summarization model
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Hub revision (branch, tag or commit)
    #[serde(default = "default_revision")]
    pub revision: String,
    /// Hub cache directory; defaults to the hf-hub cache
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Task prefix prepended to the article text
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Input longer than this many tokens is truncated
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,
    /// Maximum number of generated tokens
    #[serde(default = "default_max_summary_tokens")]
    pub max_summary_tokens: usize,
    /// Sampling temperature (0 = greedy decoding)
    #[serde(default)]
    pub temperature: f64,
    /// Nucleus sampling threshold (0 = disabled)
    #[serde(default)]
    pub top_p: f64,
    /// Penalty applied to recently generated tokens (1.0 = none)
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,
    /// Number of trailing tokens the repeat penalty looks at
    #[serde(default = "default_repeat_last_n")]
    pub repeat_last_n: usize,
    /// Sampling seed
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            revision: default_revision(),
            cache_dir: None,
            prefix: default_prefix(),
            max_input_tokens: default_max_input_tokens(),
            max_summary_tokens: default_max_summary_tokens(),
            temperature: 0.0,
            top_p: 0.0,
            repeat_penalty: default_repeat_penalty(),
            repeat_last_n: default_repeat_last_n(),
            seed: default_seed(),
        }
    }
}

impl ModelConfig {
    /// Hub cache directory (with tilde expansion)
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.as_deref().map(expand_tilde)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Articles summarized at the same time (1 = strictly sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_country() -> Country {
    Country::Us
}

fn default_category() -> Category {
    Category::General
}

fn default_model_id() -> String {
    "google-t5/t5-small".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_prefix() -> String {
    "summarize: ".to_string()
}

fn default_max_input_tokens() -> usize {
    512
}

fn default_max_summary_tokens() -> usize {
    150
}

fn default_repeat_penalty() -> f32 {
    1.1
}

fn default_repeat_last_n() -> usize {
    64
}

fn default_seed() -> u64 {
    299792458
}

fn default_concurrency() -> usize {
    1
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a TOML document
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/newsdigest/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("newsdigest")
            .join("config.toml")
    }
}
