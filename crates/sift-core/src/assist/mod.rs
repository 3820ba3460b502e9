//! Assistive classifier gateway
//!
//! Optional, user-triggered category suggestions from an external classifier.
//! Every call is bounded by a timeout. Output is salvaged where possible and
//! any failure comes back as `Error::AssistUnavailable`. The gateway never retries and
//! never writes to the ledger.
//!
//! # Architecture
//!
//! - `AssistBackend` trait: one prompt in, raw text out
//! - `AssistClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backends: `CommandBackend` (`codex exec`), `OllamaBackend`, `MockBackend`
//! - `AssistGateway`: prompt building, timeout, parsing and validation
//!
//! # Usage
//!
//! ```rust,ignore
//! let gateway = AssistGateway::from_config(&config.assist);
//! match gateway.classify_transaction(&db, tx_id).await {
//!     Ok(suggestion) => println!("{}", suggestion.category),
//!     Err(e) => println!("No suggestion: {}", e),
//! }
//! ```

pub(crate) mod command;
mod mock;
pub(crate) mod ollama;
pub mod parsing;
pub mod prompt;

pub use command::CommandBackend;
pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AssistConfig;
use crate::db::{Database, KNOWN_CATEGORY_LIMIT};
use crate::error::{AssistFailure, Error, Result};
use crate::models::Suggestion;

use parsing::parse_classification;
use prompt::build_prompt;

/// Default bound on one classifier call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// A one-shot text completion service
#[async_trait]
pub trait AssistBackend: Send + Sync {
    /// Send one prompt, return the raw reply text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

/// Concrete backend enum
#[derive(Clone)]
pub enum AssistClient {
    /// External CLI, prompt passed as the last argument
    Command(CommandBackend),
    /// Ollama HTTP API
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AssistClient {
    /// Build the configured backend, or None when assistance is off
    pub fn from_config(config: &AssistConfig) -> Option<Self> {
        let backend = config.backend.as_deref()?.trim().to_lowercase();

        match backend.as_str() {
            "" | "none" | "off" => None,
            "command" | "codex" => Some(AssistClient::Command(CommandBackend::new(
                &config.command,
                config.args.clone(),
            ))),
            "ollama" => match config.ollama_host.as_deref() {
                Some(host) => Some(AssistClient::Ollama(OllamaBackend::new(
                    host,
                    &config.ollama_model,
                ))),
                None => {
                    warn!("Assist backend is ollama but no Ollama host is set");
                    None
                }
            },
            "mock" => Some(AssistClient::Mock(MockBackend::new())),
            _ => {
                warn!(backend = %backend, "Unknown assist backend, assistance disabled");
                None
            }
        }
    }

    pub fn mock() -> Self {
        AssistClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AssistBackend for AssistClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            AssistClient::Command(b) => b.complete(prompt).await,
            AssistClient::Ollama(b) => b.complete(prompt).await,
            AssistClient::Mock(b) => b.complete(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AssistClient::Command(b) => b.health_check().await,
            AssistClient::Ollama(b) => b.health_check().await,
            AssistClient::Mock(b) => b.health_check().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AssistClient::Command(b) => b.name(),
            AssistClient::Ollama(b) => b.name(),
            AssistClient::Mock(b) => b.name(),
        }
    }
}

/// Bounded, side-effect-free access to the classifier
#[derive(Clone)]
pub struct AssistGateway {
    client: Option<AssistClient>,
    timeout: Duration,
}

impl AssistGateway {
    pub fn new(client: AssistClient, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            timeout,
        }
    }

    /// A gateway that always reports `NotConfigured`
    pub fn disabled() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &AssistConfig) -> Self {
        let timeout = config.timeout();
        match AssistClient::from_config(config) {
            Some(client) => {
                info!(backend = client.name(), ?timeout, "Assistive classifier configured");
                Self::new(client, timeout)
            }
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&AssistClient> {
        self.client.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the classifier for a category.
    ///
    /// Every failure is `Error::AssistUnavailable`. Dropping the returned
    /// future aborts the backend call.
    pub async fn classify(
        &self,
        merchant_raw: &str,
        details: &str,
        amount_cents: i64,
        known_categories: &[String],
    ) -> Result<Suggestion> {
        let client = self
            .client
            .as_ref()
            .ok_or(Error::AssistUnavailable(AssistFailure::NotConfigured))?;

        let prompt = build_prompt(merchant_raw, details, amount_cents, known_categories);

        let outcome = match tokio::time::timeout(self.timeout, client.complete(&prompt)).await {
            Err(_) => Err(AssistFailure::Timeout(self.timeout)),
            Ok(Err(Error::AssistUnavailable(failure))) => Err(failure),
            Ok(Err(e)) => Err(AssistFailure::Invocation(e.to_string())),
            Ok(Ok(text)) => parse_classification(&text),
        };

        outcome.map_err(|failure| {
            warn!(backend = client.name(), merchant = merchant_raw, %failure, "Assistive classification unavailable");
            Error::AssistUnavailable(failure)
        })
    }

    /// Like `classify`, but gives up as soon as `cancel` completes
    pub async fn classify_with_cancel<C>(
        &self,
        merchant_raw: &str,
        details: &str,
        amount_cents: i64,
        known_categories: &[String],
        cancel: C,
    ) -> Result<Suggestion>
    where
        C: Future<Output = ()> + Send,
    {
        tokio::select! {
            biased;
            _ = cancel => Err(Error::AssistUnavailable(AssistFailure::Cancelled)),
            result = self.classify(merchant_raw, details, amount_cents, known_categories) => result,
        }
    }

    /// Classify a stored transaction.
    ///
    /// Reads the transaction and the known categories first and releases the
    /// connection before awaiting the classifier.
    pub async fn classify_transaction(&self, db: &Database, id: i64) -> Result<Suggestion> {
        let (merchant, details, amount_cents, known) = {
            let tx = db
                .get_transaction(id)?
                .ok_or_else(|| Error::NotFound(format!("Transaction {} not found", id)))?;
            let known = db.known_categories(KNOWN_CATEGORY_LIMIT)?;
            (tx.merchant_raw, tx.details, tx.amount_cents, known)
        };

        self.classify(&merchant, &details, amount_cents, &known).await
    }
}
