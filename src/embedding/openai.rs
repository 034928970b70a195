//! OpenAI-compatible embedding client.
//!
//! Talks to `POST {base}/embeddings` with bearer auth, or to an Azure OpenAI
//! deployment (`{endpoint}/openai/deployments/{name}/embeddings?api-version=..`)
//! with an `api-key` header. Every request is bounded by the client timeout
//! and is never retried here; retry policy belongs to the caller.

use super::Embedder;
use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::EmbeddingError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_AZURE_API_VERSION: &str = "2024-12-01-preview";

/// How the API key is presented to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    Bearer,
    AzureApiKey,
}

pub struct OpenAiEmbedder {
    client: Client,
    endpoint: Url,
    api_key: SecretString,
    auth: AuthStyle,
    model: String,
    dimensions: Option<usize>,
    timeout: Duration,
}

impl OpenAiEmbedder {
    pub fn new(
        endpoint: Url,
        api_key: SecretString,
        auth: AuthStyle,
        model: String,
        dimensions: Option<usize>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if model.trim().is_empty() {
            return Err(EmbeddingError::Config("missing embedding model name".into()));
        }
        if api_key.expose_secret().trim().is_empty() {
            return Err(EmbeddingError::Config("empty API key".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, endpoint, api_key, auth, model, dimensions, timeout })
    }

    /// Build from configuration, reading credentials from the environment.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        match config.provider {
            EmbeddingProvider::Azure => {
                let key = read_env("AZURE_OPENAI_API_KEY")?;
                let base = match &config.endpoint {
                    Some(endpoint) => endpoint.clone(),
                    None => env::var("AZURE_OPENAI_ENDPOINT")
                        .map_err(|_| EmbeddingError::MissingCredentials("AZURE_OPENAI_ENDPOINT"))?,
                };
                let deployment = config.deployment.as_deref().unwrap_or(config.model.as_str());
                let api_version =
                    config.api_version.as_deref().unwrap_or(DEFAULT_AZURE_API_VERSION);
                let endpoint = azure_endpoint(&base, deployment, api_version)?;
                Self::new(endpoint, key, AuthStyle::AzureApiKey, config.model.clone(), config.dimensions, timeout)
            }
            EmbeddingProvider::OpenAi => {
                let key = read_env("OPENAI_API_KEY")?;
                let base = config.endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_BASE);
                let endpoint = openai_endpoint(base)?;
                Self::new(endpoint, key, AuthStyle::Bearer, config.model.clone(), config.dimensions, timeout)
            }
            EmbeddingProvider::Ngram => {
                Err(EmbeddingError::Config("the ngram provider does not use an HTTP client".into()))
            }
        }
    }

    async fn request(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbeddingRequest { model: &self.model, input: inputs, dimensions: self.dimensions };
        let request = self.client.post(self.endpoint.clone()).json(&body);
        let request = match self.auth {
            AuthStyle::Bearer => request.bearer_auth(self.api_key.expose_secret()),
            AuthStyle::AzureApiKey => request.header("api-key", self.api_key.expose_secret()),
        };

        debug!("Requesting {} embedding(s) from {}", inputs.len(), self.endpoint);
        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Request(format!("HTTP {}: {}", status, text)));
        }
        let text = response.text().await.map_err(|e| self.classify(e))?;
        parse_response(&text, inputs.len(), self.dimensions)
    }

    fn classify(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout(self.timeout)
        } else {
            EmbeddingError::from(err)
        }
    }
}

fn read_env(name: &'static str) -> Result<SecretString, EmbeddingError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(EmbeddingError::MissingCredentials(name)),
    }
}

pub fn openai_endpoint(base: &str) -> Result<Url, EmbeddingError> {
    let raw = format!("{}/embeddings", base.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| EmbeddingError::Config(format!("invalid endpoint '{}': {}", raw, e)))
}

pub fn azure_endpoint(base: &str, deployment: &str, api_version: &str) -> Result<Url, EmbeddingError> {
    let raw = format!("{}/openai/deployments/{}/embeddings", base.trim_end_matches('/'), deployment);
    let mut url = Url::parse(&raw)
        .map_err(|e| EmbeddingError::Config(format!("invalid endpoint '{}': {}", raw, e)))?;
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

fn parse_response(
    body: &str,
    expected: usize,
    dimensions: Option<usize>,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut parsed: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
    if parsed.data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "got {} embeddings for {} inputs",
            parsed.data.len(),
            expected
        )));
    }
    parsed.data.sort_by_key(|entry| entry.index);

    let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|entry| entry.embedding).collect();
    for vector in &vectors {
        if vector.is_empty() {
            return Err(EmbeddingError::InvalidResponse("empty embedding".into()));
        }
        if let Some(expected) = dimensions {
            if vector.len() != expected {
                return Err(EmbeddingError::DimensionMismatch { expected, actual: vector.len() });
            }
        }
    }
    Ok(vectors)
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.request(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding returned".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}
