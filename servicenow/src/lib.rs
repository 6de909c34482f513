//! Faultline ServiceNow Module
//!
//! Creates incidents from analysis outcomes via the ServiceNow Table API and
//! attaches the full JSON diagnostic report through the Attachment API.
//! Severity from the classification table drives urgency and impact.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use faultline_core::{AnalysisOutcome, Severity};

/// Errors that can occur talking to ServiceNow
#[derive(Error, Debug)]
pub enum ServiceNowError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ServiceNow returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for ServiceNow operations
pub type Result<T> = std::result::Result<T, ServiceNowError>;

/// Connection settings for one ServiceNow instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceNowConfig {
    /// Instance base URL, e.g. `https://dev12345.service-now.com`
    pub instance_url: String,
    pub username: String,
    pub password: String,
}

/// Reference to a created incident
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRef {
    /// sys_id of the incident record
    pub sys_id: String,
    /// Human-facing incident number, e.g. `INC0010042`
    pub number: String,
}

#[derive(Debug, Deserialize)]
struct TableApiResponse {
    result: IncidentRecord,
}

#[derive(Debug, Deserialize)]
struct IncidentRecord {
    sys_id: String,
    number: String,
}

/// Client for incident creation and report attachment
pub struct IncidentClient {
    client: Client,
    config: ServiceNowConfig,
}

impl IncidentClient {
    pub fn new(config: ServiceNowConfig) -> Self {
        IncidentClient {
            client: Client::new(),
            config,
        }
    }

    /// Create an incident for one analysis outcome
    pub async fn create_incident(&self, outcome: &AnalysisOutcome) -> Result<IncidentRef> {
        let url = format!("{}/api/now/table/incident", self.config.instance_url);
        let (urgency, impact) = urgency_impact(outcome.classification.severity);

        let body = serde_json::json!({
            "short_description": short_description(outcome),
            "description": render_description(outcome),
            "urgency": urgency,
            "impact": impact,
            "category": "software",
        });
        debug!(url = %url, "creating incident");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceNowError::Status { status, body });
        }

        let created: TableApiResponse = response.json().await?;
        info!(number = %created.result.number, "incident created");
        Ok(IncidentRef {
            sys_id: created.result.sys_id,
            number: created.result.number,
        })
    }

    /// Attach the full JSON diagnostic report to an incident
    pub async fn attach_report(&self, incident: &IncidentRef, outcome: &AnalysisOutcome) -> Result<()> {
        let url = format!(
            "{}/api/now/attachment/file?table_name=incident&table_sys_id={}&file_name=diagnostic-report-{}.json",
            self.config.instance_url, incident.sys_id, outcome.id
        );
        let payload = serde_json::to_vec_pretty(outcome)?;
        debug!(url = %url, bytes = payload.len(), "attaching report");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceNowError::Status { status, body });
        }

        info!(number = %incident.number, "report attached");
        Ok(())
    }
}

/// Severity -> (urgency, impact) on the 1..3 ServiceNow scale
fn urgency_impact(severity: Severity) -> (u8, u8) {
    match severity {
        Severity::Critical => (1, 1),
        Severity::High => (2, 2),
        Severity::Error => (3, 3),
    }
}

fn short_description(outcome: &AnalysisOutcome) -> String {
    let fault = &outcome.report.fault;
    match &fault.class_name {
        Some(class) => format!("{} in {}", fault.fault_type, class),
        None => format!("{} reported by {} runtime", fault.fault_type, fault.language),
    }
}

/// Plain-text incident body rendered from the diagnostic report
fn render_description(outcome: &AnalysisOutcome) -> String {
    let report = &outcome.report;
    let mut sections = vec![
        format!("Raw error:\n{}", report.fault.raw_message),
        format!("Possible causes:\n- {}", report.possible_causes.join("\n- ")),
        format!("Suggested fixes:\n- {}", report.suggested_fixes.join("\n- ")),
        format!("Best practices:\n- {}", report.best_practices.join("\n- ")),
    ];
    if let Some(narrative) = &report.root_cause_narrative {
        sections.push(format!("Root cause:\n{}", narrative));
    }
    if let Some(selected) = &report.selected_file {
        sections.push(format!(
            "Source file: {} ({})",
            selected.path, selected.reason
        ));
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::{AnalysisEngine, RepoEntry, RepositoryReader};
    use std::sync::Arc;

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

    async fn sample_outcome(message: &str) -> AnalysisOutcome {
        AnalysisEngine::new(Arc::new(NoRepository))
            .analyze(message)
            .await
            .unwrap()
    }

    #[test]
    fn test_urgency_mapping() {
        assert_eq!(urgency_impact(Severity::Critical), (1, 1));
        assert_eq!(urgency_impact(Severity::High), (2, 2));
        assert_eq!(urgency_impact(Severity::Error), (3, 3));
    }

    #[tokio::test]
    async fn test_short_description_uses_class_name() {
        let outcome = sample_outcome(
            "System.NullPointerException: Attempt to de-reference a null object. \
             Class.AccountHandler.processAccount: line 45, column 12",
        )
        .await;

        assert_eq!(
            short_description(&outcome),
            "NullPointerException in AccountHandler"
        );
    }

    #[tokio::test]
    async fn test_description_contains_guidance_sections() {
        let outcome = sample_outcome("System.LimitException: Too many SOQL queries: 101").await;
        let description = render_description(&outcome);

        assert!(description.contains("Raw error:"));
        assert!(description.contains("Possible causes:"));
        assert!(description.contains("Suggested fixes:"));
        assert!(description.contains("Best practices:"));
    }
}
