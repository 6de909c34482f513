//! API Handlers Module
//!
//! Request handlers for the analysis service. Degradation rules: a blank
//! error message is the only client error; LLM and ServiceNow failures are
//! logged and reported as absent fields, never as HTTP failures.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use faultline_core::{AnalysisEngine, AnalysisError};
use faultline_servicenow::IncidentClient;

use crate::llm::LlmAnalyzer;
use crate::models::{AnalyzeRequest, AnalyzeResponse};

/// Shared state of the API server
pub struct ApiState {
    /// Core analysis engine
    pub engine: Arc<AnalysisEngine>,
    /// Ticketing client; absent when ServiceNow is not configured
    pub incidents: Option<Arc<IncidentClient>>,
    /// Enrichment client; absent when no LLM provider is configured
    pub llm: Option<Arc<LlmAnalyzer>>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HashMap<String, String>> {
    let mut response = HashMap::new();
    response.insert("status".to_string(), "healthy".to_string());
    response.insert("service".to_string(), "faultline-api".to_string());
    Json(response)
}

/// Analyze one raw error message
pub async fn analyze(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, StatusCode> {
    tracing::debug!(
        create_incident = request.create_incident,
        deep_analysis = request.deep_analysis,
        "analyze request received"
    );

    let outcome = match state.engine.analyze(&request.error_message).await {
        Ok(outcome) => outcome,
        Err(AnalysisError::EmptyMessage) => return Err(StatusCode::BAD_REQUEST),
    };

    let ai_analysis = match (&state.llm, request.deep_analysis) {
        (Some(llm), true) => match llm.analyze(&outcome).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("LLM enrichment failed, returning rule-based report only: {}", e);
                None
            }
        },
        _ => None,
    };

    let incident = match (&state.incidents, request.create_incident) {
        (Some(client), true) => match client.create_incident(&outcome).await {
            Ok(incident) => {
                if let Err(e) = client.attach_report(&incident, &outcome).await {
                    tracing::warn!(number = %incident.number, "report attachment failed: {}", e);
                }
                Some(incident)
            }
            Err(e) => {
                tracing::error!("incident creation failed: {}", e);
                None
            }
        },
        _ => None,
    };

    Ok(Json(AnalyzeResponse {
        outcome,
        ai_analysis,
        incident,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::{RepoEntry, RepositoryReader};

    struct NoRepository;

    #[async_trait::async_trait]
    impl RepositoryReader for NoRepository {
        async fn list_tree(&self) -> anyhow::Result<Vec<RepoEntry>> {
            Ok(Vec::new())
        }

        async fn fetch_file(&self, _path: &str) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("unavailable"))
        }
    }

    fn state() -> Arc<ApiState> {
        Arc::new(ApiState {
            engine: Arc::new(AnalysisEngine::new(Arc::new(NoRepository))),
            incidents: None,
            llm: None,
        })
    }

    #[tokio::test]
    async fn test_blank_message_returns_bad_request() {
        let result = analyze(
            State(state()),
            Json(AnalyzeRequest {
                error_message: "   ".to_string(),
                create_incident: false,
                deep_analysis: false,
            }),
        )
        .await;

        assert_eq!(result.err(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_analyze_returns_report_without_collaborators() {
        let result = analyze(
            State(state()),
            Json(AnalyzeRequest {
                error_message: "System.NullPointerException: Attempt to de-reference a null \
                                object. Class.AccountHandler.processAccount: line 45, column 12"
                    .to_string(),
                create_incident: true,
                deep_analysis: true,
            }),
        )
        .await
        .unwrap();

        let response = result.0;
        assert_eq!(response.outcome.report.fault.fault_type, "NullPointerException");
        // Neither collaborator is configured; both enrichments are absent.
        assert!(response.ai_analysis.is_none());
        assert!(response.incident.is_none());
    }

    #[tokio::test]
    async fn test_health_check_reports_healthy() {
        let response = health_check().await.0;
        assert_eq!(response.get("status").map(String::as_str), Some("healthy"));
    }
}
