//! API Models Module
//!
//! Request and response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};

use faultline_core::AnalysisOutcome;
use faultline_servicenow::IncidentRef;

/// Server bind configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw error message to analyze
    pub error_message: String,
    /// File a ServiceNow incident for the result
    #[serde(default)]
    pub create_incident: bool,
    /// Run the optional LLM enrichment pass
    #[serde(default)]
    pub deep_analysis: bool,
}

/// Body of a successful analysis response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    /// LLM enrichment text, when requested and available
    pub ai_analysis: Option<String>,
    /// Created incident, when requested and the call succeeded
    pub incident: Option<IncidentRef>,
}
