//! Ollama backend
//!
//! Sends the prompt to `/api/generate` with streaming off and returns the
//! model's `response` text untouched; parsing happens in the gateway.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AssistFailure, Error, Result};

use super::AssistBackend;

pub const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AssistBackend for OllamaBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AssistUnavailable(AssistFailure::Invocation(format!(
                "Ollama returned {}",
                status
            ))));
        }

        let body: OllamaResponse = response.json().await?;
        debug!("Ollama response: {}", body.response);
        Ok(body.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(r) => r.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockOllamaServer;

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockOllamaServer::start().await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2");

        assert!(backend.health_check().await);
        let out = backend
            .complete("Merchant: NETFLIX.COM\nDetails: \n")
            .await
            .unwrap();
        assert!(out.contains("Subscriptions"));
    }

    #[tokio::test]
    async fn test_error_status_is_invocation_failure() {
        let server = MockOllamaServer::start().await;
        let backend = OllamaBackend::new(&format!("{}/missing", server.url()), "llama3.2");

        let err = backend.complete("Merchant: X\n").await.unwrap_err();
        assert!(matches!(
            err,
            Error::AssistUnavailable(AssistFailure::Invocation(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unhealthy() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3.2");
        assert!(!backend.health_check().await);
    }
}
