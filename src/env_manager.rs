use crate::config::EmbeddingProvider;
use log::{info, warn};
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Credentials each embedding provider needs.
pub fn required_env_vars(provider: EmbeddingProvider) -> &'static [&'static str] {
    match provider {
        EmbeddingProvider::Ngram => &[],
        EmbeddingProvider::OpenAi => &["OPENAI_API_KEY"],
        EmbeddingProvider::Azure => &["AZURE_OPENAI_API_KEY", "AZURE_OPENAI_ENDPOINT"],
    }
}

// Names of optional environment variables
pub const OPTIONAL_ENV_VARS: &[&str] = &[
    "MEETWISE_LOG",
    "MEETWISE_ROSTER_PATH",
    "VECTOR_DB_SIMILARITY_THRESHOLD",
    "VECTOR_DB_MODEL",
    "DEFAULT_MEETING_DURATION",
    "BUSINESS_HOURS_START",
    "BUSINESS_HOURS_END",
    "DEFAULT_TIMEZONE",
];

/// Variables the provider needs that are unset or blank.
pub fn missing_env_vars(provider: EmbeddingProvider) -> Vec<&'static str> {
    missing_with(provider, |name| env::var(name).ok())
}

fn missing_with<F>(provider: EmbeddingProvider, lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    required_env_vars(provider)
        .iter()
        .copied()
        .filter(|var| lookup(var).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

pub fn check_env_vars(provider: EmbeddingProvider) -> bool {
    let missing = missing_env_vars(provider);
    for var in &missing {
        println!("❌ Missing required environment variable: {}", var);
    }
    missing.is_empty()
}

/// Load `.env` from the working directory, writing a template when there is none.
pub fn load_env_file() {
    load_env_file_from(Path::new(".env"))
}

fn load_env_file_from(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => info!("Loaded environment from {:?}", path),
        Err(e) => {
            info!("No .env file found or error loading it: {}", e);
            match create_env_template(path) {
                Ok(true) => info!("Wrote environment template to {:?}", path),
                Ok(false) => {}
                Err(e) => warn!("Could not write environment template {:?}: {}", path, e),
            }
        }
    }
}

/// Write a commented `.env` template; an existing file is left alone.
pub fn create_env_template(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let mut file = File::create(path)?;
    writeln!(file, "# OpenAI embeddings")?;
    writeln!(file, "# OPENAI_API_KEY=")?;
    writeln!(file, "# Azure OpenAI embeddings")?;
    writeln!(file, "# AZURE_OPENAI_API_KEY=")?;
    writeln!(file, "# AZURE_OPENAI_ENDPOINT=")?;
    for var in OPTIONAL_ENV_VARS {
        writeln!(file, "# {}=", var)?;
    }
    Ok(true)
}
