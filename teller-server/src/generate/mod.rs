//! Text-generation client abstraction.
//!
//! Provides a unified interface over hosted generation APIs, with a retry
//! wrapper that backs off on rate limiting.

mod cohere;
mod retry;

pub use cohere::CohereClient;
pub use retry::{RetryConfig, RetryingClient};

use async_trait::async_trait;

/// Error from a generation client.
#[derive(Debug, Clone)]
pub struct GenerationError {
    pub provider: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl GenerationError {
    /// Whether this error is an upstream rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == Some(429)
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for GenerationError {}

/// Unified interface for text-generation services.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Get the client name.
    fn name(&self) -> &str;

    /// Whether the client has the credentials it needs to make requests.
    fn is_configured(&self) -> bool {
        true
    }

    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
