//! Test utilities for sift-core
//!
//! A mock Ollama server that answers classification prompts the way a chatty
//! model would: a sentence of commentary followed by the JSON object.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL, usable as `OLLAMA_HOST`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
}

#[derive(Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
        }],
    })
}

async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let merchant = request
        .prompt
        .lines()
        .find_map(|l| l.strip_prefix("Merchant:"))
        .unwrap_or("")
        .trim()
        .to_uppercase();

    let (category, reason, confidence) = if merchant.contains("NETFLIX") {
        ("Subscriptions", "streaming service", "high")
    } else if merchant.contains("CAFE") || merchant.contains("STARBUCKS") {
        ("Dining", "coffee shop", "med")
    } else if merchant.contains("SHELL") || merchant.contains("UBER") {
        ("Transport", "fuel or rides", "med")
    } else {
        ("Other", "no strong signal", "low")
    };

    let json = serde_json::json!({
        "category": category,
        "reason": reason,
        "confidence": confidence,
    });

    Json(GenerateResponse {
        model: request.model,
        response: format!("Sure! Based on the merchant name, here is my answer:\n{}\n", json),
        done: true,
    })
}
