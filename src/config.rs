use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub meeting: MeetingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub similarity_threshold: f32,
    pub ambiguity_margin: f32,
    pub max_candidates: usize,
    /// Also index first name, last name and e-mail local part per person.
    pub index_aliases: bool,
    /// Upper bound on a single embedder call, in milliseconds.
    pub embed_timeout_ms: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            ambiguity_margin: 0.05,
            max_candidates: 5,
            index_aliases: true,
            embed_timeout_ms: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Ngram,
    OpenAi,
    Azure,
}

impl Default for EmbeddingProvider {
    fn default() -> Self {
        EmbeddingProvider::Ngram
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimensions: Option<usize>,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            model: crate::embedding::ngram::MODEL_ID.to_string(),
            dimensions: None,
            endpoint: None,
            deployment: None,
            api_version: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// CSV roster; the built-in sample roster is used when unset.
    pub roster_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    pub default_duration_minutes: u32,
    pub business_hours_start: String,
    pub business_hours_end: String,
    pub timezone: String,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: 30,
            business_hours_start: "09:00".to_string(),
            business_hours_end: "17:00".to_string(),
            timezone: "Europe/Istanbul".to_string(),
        }
    }
}

impl Config {
    /// Load the user config file, creating it with defaults if missing, then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        let mut config = if config_path.exists() {
            Self::read(&config_path)?
        } else {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            default_config
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load an explicit config file, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        debug!("Reading config from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from any variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(raw) = value("VECTOR_DB_SIMILARITY_THRESHOLD") {
            self.resolver.similarity_threshold = raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("VECTOR_DB_SIMILARITY_THRESHOLD is not a number: '{}'", raw))?;
        }
        if let Some(raw) = value("VECTOR_DB_MODEL") {
            self.embedding.model = raw.trim().to_string();
        }
        if let Some(raw) = value("DEFAULT_MEETING_DURATION") {
            self.meeting.default_duration_minutes = raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("DEFAULT_MEETING_DURATION is not a whole number: '{}'", raw))?;
        }
        if let Some(raw) = value("BUSINESS_HOURS_START") {
            self.meeting.business_hours_start = raw.trim().to_string();
        }
        if let Some(raw) = value("BUSINESS_HOURS_END") {
            self.meeting.business_hours_end = raw.trim().to_string();
        }
        if let Some(raw) = value("DEFAULT_TIMEZONE") {
            self.meeting.timezone = raw.trim().to_string();
        }
        if let Some(raw) = value("MEETWISE_ROSTER_PATH") {
            self.directory.roster_path = Some(PathBuf::from(raw.trim()));
        }
        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "meetwise", "meetwise")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
