//! Query embedding through a remote model server.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VecDbError};

/// Maximum bytes of query text sent to the embedding server.
const MAX_EMBED_BYTES: usize = 2_000;

/// Turns query text into a vector in the same space as the snapshot.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Wire protocol spoken by the embedding server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedProvider {
    /// `POST {base}/api/embed`
    Ollama,
    /// `POST {base}/v1/embeddings`
    OpenAi,
}

impl fmt::Display for EmbedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => f.write_str("ollama"),
            Self::OpenAi => f.write_str("openai"),
        }
    }
}

impl FromStr for EmbedProvider {
    type Err = VecDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(VecDbError::Embedding(format!(
                "unknown embedding provider: {other}"
            ))),
        }
    }
}

/// Connection settings for [`RemoteEmbedder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    pub provider: EmbedProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedProvider::Ollama,
            base_url: "http://localhost:11434".into(),
            model: "all-mpnet-base-v2".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl EmbedderConfig {
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.provider {
            EmbedProvider::Ollama => format!("{base}/api/embed"),
            EmbedProvider::OpenAi => format!("{base}/v1/embeddings"),
        }
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

/// Blocking HTTP client for an Ollama or OpenAI-compatible embedding server.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    client: Client,
    config: EmbedderConfig,
}

impl RemoteEmbedder {
    /// # Errors
    ///
    /// Returns `VecDbError::Http` if the HTTP client cannot be built.
    pub fn new(config: EmbedderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    fn send<T: Serialize>(&self, body: &T) -> Result<reqwest::blocking::Response> {
        let mut request = self.client.post(self.config.endpoint()).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(VecDbError::Embedding(format!(
                "{} returned {status}: {body}",
                self.config.provider
            )));
        }
        Ok(response)
    }
}

impl Embedder for RemoteEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = truncate_for_embedding(text);
        let model = self.config.model.as_str();
        debug!(provider = %self.config.provider, model, chars = text.len(), "embedding query");

        let embeddings = match self.config.provider {
            EmbedProvider::Ollama => {
                let request = OllamaEmbedRequest {
                    model,
                    input: vec![text],
                    truncate: true,
                };
                self.send(&request)?.json::<OllamaEmbedResponse>()?.embeddings
            }
            EmbedProvider::OpenAi => {
                let request = OpenAiEmbedRequest {
                    model,
                    input: vec![text],
                };
                self.send(&request)?
                    .json::<OpenAiEmbedResponse>()?
                    .data
                    .into_iter()
                    .map(|d| d.embedding)
                    .collect()
            }
        };

        embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| VecDbError::Embedding("no embedding returned".into()))
    }
}

/// Truncates `text` to at most `MAX_EMBED_BYTES` bytes on a char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_BYTES {
        return text;
    }
    let mut end = MAX_EMBED_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
