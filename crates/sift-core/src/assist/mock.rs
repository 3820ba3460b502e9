//! Mock backend for testing
//!
//! Replies with a keyword-based classification by default. Can be set to
//! reply with fixed text, fail, stall for a while, or never reply at all.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AssistFailure, Error, Result};

use super::AssistBackend;

#[derive(Debug, Clone)]
enum Behavior {
    Keywords,
    Reply(String),
    Fail(String),
    Hang,
}

#[derive(Debug, Clone)]
pub struct MockBackend {
    behavior: Behavior,
    delay: Option<Duration>,
    /// Whether health_check should return true
    pub healthy: bool,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Keyword classifier over the prompt's merchant line (healthy)
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Keywords,
            delay: None,
            healthy: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always return `text` verbatim
    pub fn replying(text: &str) -> Self {
        Self {
            behavior: Behavior::Reply(text.to_string()),
            ..Self::new()
        }
    }

    /// Always fail with an invocation error
    pub fn failing(message: &str) -> Self {
        Self {
            behavior: Behavior::Fail(message.to_string()),
            ..Self::new()
        }
    }

    /// Never reply
    pub fn hanging() -> Self {
        Self {
            behavior: Behavior::Hang,
            ..Self::new()
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Sleep before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls made so far, shared across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn classify_by_keyword(prompt: &str) -> String {
    let merchant = prompt
        .lines()
        .find_map(|l| l.strip_prefix("Merchant:"))
        .unwrap_or(prompt)
        .to_uppercase();

    let (category, confidence) = match merchant.as_str() {
        m if m.contains("NETFLIX") || m.contains("SPOTIFY") => ("Subscriptions", "high"),
        m if m.contains("CAFE") || m.contains("COFFEE") || m.contains("STARBUCKS") => {
            ("Dining", "med")
        }
        m if m.contains("UBER") || m.contains("SHELL") || m.contains("METRO") => {
            ("Transport", "med")
        }
        m if m.contains("WHOLE FOODS") || m.contains("MARKET") => ("Groceries", "med"),
        _ => ("Other", "low"),
    };

    format!(
        "Here you go: {{\"category\":\"{}\",\"reason\":\"mock keyword match\",\"confidence\":\"{}\"}}",
        category, confidence
    )
}

#[async_trait]
impl AssistBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Keywords => Ok(classify_by_keyword(prompt)),
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => Err(Error::AssistUnavailable(AssistFailure::Invocation(
                message.clone(),
            ))),
            Behavior::Hang => std::future::pending().await,
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn name(&self) -> &str {
        "mock"
    }
}
