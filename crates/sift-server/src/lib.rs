//! Sift Web Server
//!
//! Axum-based JSON API over the sift core: statement upload, ledger browsing,
//! manual edits, rule management and on-demand assistive suggestions.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Input validation (pagination limits, upload size limit)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use sift_core::{AssistBackend, AssistGateway, Database};

mod handlers;

/// Maximum statement upload size (25 MB)
pub const MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Largest accepted statement file in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            max_upload_size: MAX_UPLOAD_SIZE,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub gateway: AssistGateway,
    pub config: ServerConfig,
}

/// Create the application router
pub fn create_router(db: Database, gateway: AssistGateway, config: ServerConfig) -> Router {
    if let Some(client) = gateway.client() {
        info!(
            "Assistive classifier configured: {} (timeout {:?})",
            client.name(),
            gateway.timeout()
        );
    } else {
        info!("ℹ️  Assistive classifier not configured (set SIFT_ASSIST_BACKEND to enable)");
    }

    let upload_limit = config.max_upload_size + MULTIPART_OVERHEAD;

    let state = Arc::new(AppState {
        db,
        gateway,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Imports
        .route(
            "/import",
            post(handlers::import_csv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/imports", get(handlers::list_imports))
        .route("/imports/:id", get(handlers::get_import))
        // Transactions
        .route("/transactions", get(handlers::list_transactions))
        .route(
            "/transactions/:id",
            get(handlers::get_transaction).put(handlers::update_transaction),
        )
        .route("/transactions/:id/assist", post(handlers::assist_transaction))
        // Rules
        .route(
            "/rules",
            get(handlers::list_rules).post(handlers::create_rule),
        )
        .route("/rules/:id", delete(handlers::delete_rule))
        .route("/rules/:id/move", post(handlers::move_rule))
        .route("/rules/:id/enabled", post(handlers::set_rule_enabled))
        // Overrides
        .route("/overrides", get(handlers::list_overrides))
        // Reports
        .route("/summary", get(handlers::get_summary));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    gateway: AssistGateway,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_assist_connection(&gateway).await;

    let app = create_router(db, gateway, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log assistive backend reachability
async fn check_assist_connection(gateway: &AssistGateway) {
    if let Some(client) = gateway.client() {
        if client.health_check().await {
            info!("✅ Assistive classifier reachable: {}", client.name());
        } else {
            warn!(
                "⚠️  Assistive classifier configured but not responding: {}",
                client.name()
            );
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn payload_too_large(msg: &str) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map core errors the client can act on; everything else is a 500
    pub fn from_core(err: sift_core::Error) -> Self {
        match err {
            sift_core::Error::NotFound(msg) => Self::not_found(&msg),
            sift_core::Error::InvalidData(msg) => Self::bad_request(&msg),
            sift_core::Error::Import { rows_seen, source } => match *source {
                sift_core::Error::Csv(e) => Self::bad_request(&format!(
                    "Could not read statement after {} rows: {}",
                    rows_seen, e
                )),
                other => Self::import_failed(rows_seen, other),
            },
            other => Self::from(other),
        }
    }

    /// 500 naming the row count and the class of cause; details stay in the log
    fn import_failed(rows_seen: usize, source: sift_core::Error) -> Self {
        let cause = match &source {
            sift_core::Error::Database(_) => "database write failed",
            sift_core::Error::Pool(_) => "database unavailable",
            sift_core::Error::Io(_) => "could not read upload",
            _ => "internal error",
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!(
                "Import failed after {} rows, nothing was saved: {}",
                rows_seen, cause
            ),
            internal: Some(
                sift_core::Error::Import {
                    rows_seen,
                    source: Box::new(source),
                }
                .into(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
