//! Warehouse chatbot pipeline.
//!
//! A short, mostly linear flow per message:
//! router → fetcher → composer → generation client.
//!
//! Per-table fetches run sequentially; the tables are independent, so
//! fan-out would be safe, but the contract doesn't require it.

pub mod fetch;
pub mod lexicon;
pub mod prompt;
pub mod session;

pub use lexicon::HELP_MESSAGE;
pub use session::{SessionContext, SessionStore};

use crate::generate::GenerationClient;
use crate::warehouse::Warehouse;
use std::sync::Arc;
use teller_common::Error;

/// The chatbot service: resolves a message against the warehouse and asks
/// the generation service to summarize.
#[derive(Clone)]
pub struct ChatService {
    warehouse: Arc<dyn Warehouse>,
    generator: Arc<dyn GenerationClient>,
    sessions: SessionStore,
    row_limit: u32,
}

impl ChatService {
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        generator: Arc<dyn GenerationClient>,
        row_limit: u32,
    ) -> Self {
        Self {
            warehouse,
            generator,
            sessions: SessionStore::new(),
            row_limit,
        }
    }

    /// Handle one chat message for a session.
    pub async fn handle(&self, message: &str, session_id: &str) -> Result<String, Error> {
        if !self.generator.is_configured() {
            tracing::error!("Generation API key is not configured");
            return Err(Error::Config(
                "generation API key is not configured".to_string(),
            ));
        }

        if message.is_empty() || session_id.is_empty() {
            return Err(Error::InvalidInput(
                "message and sessionId are required".to_string(),
            ));
        }

        self.sessions.touch(session_id).await;

        let tables = lexicon::relevant_tables(message);
        tracing::debug!(?tables, "Resolved relevant tables");

        if tables.is_empty() {
            return Ok(HELP_MESSAGE.to_string());
        }

        let data = fetch::fetch_tables(self.warehouse.as_ref(), &tables, self.row_limit).await?;

        let prompt = prompt::compose(message, &data);

        match self.generator.generate(&prompt).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(error = %e, "Generation rate limited after retries");
                Err(Error::RateLimited(e.to_string()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Generation failed");
                Err(Error::Generation(e.message))
            }
        }
    }

    /// Number of sessions seen so far.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }
}
