//! API Server Module
//!
//! Router construction and server startup for the analysis service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use faultline_core::AnalysisEngine;
use faultline_servicenow::IncidentClient;

use crate::handlers::{analyze, health_check, ApiState};
use crate::llm::LlmAnalyzer;
use crate::models::ApiConfig;

/// Main API server
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiConfig,
        engine: Arc<AnalysisEngine>,
        incidents: Option<Arc<IncidentClient>>,
        llm: Option<Arc<LlmAnalyzer>>,
    ) -> Self {
        let state = Arc::new(ApiState {
            engine,
            incidents,
            llm,
        });

        Self { config, state }
    }

    /// Start serving until the process stops
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting Faultline API server on {}:{}",
            self.config.host, self.config.port
        );

        let app = Router::new()
            .route("/api/analyze", post(analyze))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        info!("Faultline API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        Ok(())
    }
}
