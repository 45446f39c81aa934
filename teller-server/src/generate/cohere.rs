//! Cohere generation client.
//!
//! Thin typed wrapper over the hosted `/v1/generate` endpoint with bearer
//! authentication. Retry behavior is layered on top by `RetryingClient`.

use super::{GenerationClient, GenerationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use teller_common::config::GenerationConfig;

/// A client for the Cohere generate API.
pub struct CohereClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: i64,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    max_tokens: i64,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

impl CohereClient {
    /// Create a client from the generation configuration.
    pub fn new(config: &GenerationConfig) -> Self {
        Self::with_params(
            config.api_key.as_deref(),
            &config.base_url,
            &config.model,
            config.max_tokens,
            config.temperature,
        )
    }

    /// Create a client with explicit parameters.
    pub fn with_params(
        api_key: Option<&str>,
        base_url: &str,
        model: &str,
        max_tokens: i64,
        temperature: f64,
    ) -> Self {
        Self {
            api_key: api_key.map(ToString::to_string),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
            temperature,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn error(&self, message: String, status_code: Option<u16>) -> GenerationError {
        GenerationError {
            provider: "cohere".to_string(),
            message,
            status_code,
        }
    }
}

#[async_trait]
impl GenerationClient for CohereClient {
    fn name(&self) -> &str {
        "cohere"
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| self.error("API key not set".to_string(), None))?;

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = format!("{}/v1/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error(format!("Request failed: {}", e), None))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.error(
                format!("API error ({}): {}", status.as_u16(), error_text),
                Some(status.as_u16()),
            ));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {}", e), None))?;

        let generation = result
            .generations
            .into_iter()
            .next()
            .ok_or_else(|| self.error("Empty response from generate API".to_string(), None))?;

        Ok(generation.text)
    }
}
