use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{MimirError, Result};

/// Average number of tokens spoken per minute, used to size model replies
pub const AVG_SPEECH_TOKENS_PER_MINUTE: u32 = 120;

/// Main configuration structure for Mimir
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Session and persistence settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Language model endpoints
    #[serde(default)]
    pub models: ModelsConfig,
    /// Memory store configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the first default
    /// location that exists, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".mimir").join("config.toml")),
            dirs::config_dir().map(|c| c.join("mimir").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MimirError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| MimirError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Label used for the Dungeon Master in prompts and transcripts
    #[serde(default = "default_ai_prefix")]
    pub ai_prefix: String,
    /// Character name used when the player does not choose one
    #[serde(default = "default_character_name")]
    pub default_character: String,
    /// Directory that `:w` writes memory files into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File name of the short-term history dump
    #[serde(default = "default_short_term_file")]
    pub short_term_file: String,
    /// File name of the long-term graph dump
    #[serde(default = "default_long_term_file")]
    pub long_term_file: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ai_prefix: default_ai_prefix(),
            default_character: default_character_name(),
            output_dir: default_output_dir(),
            short_term_file: default_short_term_file(),
            long_term_file: default_long_term_file(),
        }
    }
}

fn default_ai_prefix() -> String {
    "DM".to_string()
}

fn default_character_name() -> String {
    "Player".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_short_term_file() -> String {
    "short_term_memory.json".to_string()
}

fn default_long_term_file() -> String {
    "long_term_memory.gml".to_string()
}

/// The two models a session talks to
///
/// Each `[models.*]` table falls back field by field to the defaults of
/// its own model, so a partial `[models.extraction]` keeps the extraction
/// temperature and token budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "ModelsFile")]
pub struct ModelsConfig {
    /// Model that plays the Dungeon Master
    pub main: ModelConfig,
    /// Cheaper model used for entity and triple extraction
    pub extraction: ModelConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            main: ModelConfig::default(),
            extraction: default_extraction_model(),
        }
    }
}

impl From<ModelsFile> for ModelsConfig {
    fn from(file: ModelsFile) -> Self {
        Self {
            main: file.main.apply(ModelConfig::default()),
            extraction: file.extraction.apply(default_extraction_model()),
        }
    }
}

fn default_extraction_model() -> ModelConfig {
    ModelConfig {
        model: "gpt-4o-mini".to_string(),
        temperature: 0.0,
        max_tokens: AVG_SPEECH_TOKENS_PER_MINUTE * 2,
        ..ModelConfig::default()
    }
}

/// `[models]` as written in the file
#[derive(Debug, Default, Deserialize)]
struct ModelsFile {
    #[serde(default)]
    main: ModelOverrides,
    #[serde(default)]
    extraction: ModelOverrides,
}

/// Fields set in one `[models.*]` table
#[derive(Debug, Default, Deserialize)]
struct ModelOverrides {
    api_url: Option<String>,
    api_key_env: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

impl ModelOverrides {
    fn apply(self, base: ModelConfig) -> ModelConfig {
        ModelConfig {
            api_url: self.api_url.unwrap_or(base.api_url),
            api_key_env: self.api_key_env.unwrap_or(base.api_key_env),
            model: self.model.unwrap_or(base.model),
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            timeout_secs: self.timeout_secs.unwrap_or(base.timeout_secs),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
        }
    }
}

/// OpenAI-compatible model endpoint configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API base URL, `/chat/completions` is appended
    pub api_url: String,
    /// Environment variable name for API key
    pub api_key_env: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in a completion
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries on rate limiting or transport failure
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.2,
            max_tokens: AVG_SPEECH_TOKENS_PER_MINUTE,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

/// Memory store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Forward only the `input` key to child memories on save
    #[serde(default = "default_save_only_input")]
    pub save_only_input: bool,
    /// Sliding window of recent dialogue
    #[serde(default)]
    pub short_term: WindowConfig,
    /// Knowledge graph built from extracted triples
    #[serde(default)]
    pub long_term: GraphConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            save_only_input: default_save_only_input(),
            short_term: WindowConfig::default(),
            long_term: GraphConfig::default(),
        }
    }
}

fn default_save_only_input() -> bool {
    true
}

/// Short-term window memory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    /// Variable name the window is exposed under
    #[serde(default = "default_short_term_key")]
    pub memory_key: String,
    /// Number of exchanges rendered into the prompt
    #[serde(default = "default_short_term_k")]
    pub k: usize,
    /// Capacity of the underlying history buffer, in messages.
    /// Unset means `2 * k`, the window itself.
    #[serde(default)]
    pub max_messages: Option<usize>,
}

impl WindowConfig {
    /// Messages the history buffer holds
    pub fn capacity(&self) -> usize {
        self.max_messages.unwrap_or(self.k * 2)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            memory_key: default_short_term_key(),
            k: default_short_term_k(),
            max_messages: None,
        }
    }
}

fn default_short_term_key() -> String {
    "short_term_memory".to_string()
}

fn default_short_term_k() -> usize {
    7
}

/// Long-term knowledge graph memory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Variable name the graph context is exposed under
    #[serde(default = "default_long_term_key")]
    pub memory_key: String,
    /// Number of exchanges shown to the extraction model
    #[serde(default = "default_long_term_k")]
    pub k: usize,
    /// Capacity of the extraction history buffer, in messages
    #[serde(default = "default_long_term_max_messages")]
    pub max_messages: usize,
    /// Label for player messages in extraction transcripts
    #[serde(default = "default_human_prefix")]
    pub human_prefix: String,
    /// Label for model messages in extraction transcripts
    #[serde(default = "default_graph_ai_prefix")]
    pub ai_prefix: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            memory_key: default_long_term_key(),
            k: default_long_term_k(),
            max_messages: default_long_term_max_messages(),
            human_prefix: default_human_prefix(),
            ai_prefix: default_graph_ai_prefix(),
        }
    }
}

fn default_long_term_key() -> String {
    "long_term_memory".to_string()
}

fn default_long_term_k() -> usize {
    2
}

fn default_long_term_max_messages() -> usize {
    6
}

fn default_human_prefix() -> String {
    "Human".to_string()
}

fn default_graph_ai_prefix() -> String {
    "AI".to_string()
}
