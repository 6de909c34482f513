//! LLM Enrichment Module
//!
//! Optional single-shot chat-completion call that asks an OpenAI-compatible
//! endpoint for a deeper reading of a diagnostic report. One request, one
//! success-or-failure result; a failure never blocks the report itself.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use faultline_core::AnalysisOutcome;

/// Provider settings for the enrichment call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
        }
    }
}

/// Client for the enrichment call
pub struct LlmAnalyzer {
    client: Client,
    config: LlmConfig,
}

impl LlmAnalyzer {
    pub fn new(config: LlmConfig) -> Self {
        LlmAnalyzer {
            client: Client::new(),
            config,
        }
    }

    /// Ask the model for a deeper analysis of one outcome
    pub async fn analyze(&self, outcome: &AnalysisOutcome) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let prompt = render_prompt(outcome);
        debug!(model = %self.config.model, "requesting LLM enrichment");

        let request = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a senior engineer reviewing a production error diagnosis. \
                                Point out the most likely root cause and anything the rule-based \
                                report missed. Be concrete and brief."
                },
                { "role": "user", "content": prompt }
            ],
        });

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.json(&request).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("LLM API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        if content.is_empty() {
            return Err(anyhow!("LLM returned an empty completion"));
        }

        Ok(content)
    }
}

/// Render the diagnostic report into a prompt for the model
fn render_prompt(outcome: &AnalysisOutcome) -> String {
    let report = &outcome.report;
    let mut prompt = format!(
        "Error type: {}\nLanguage: {}\nRaw message:\n{}\n",
        report.fault.fault_type, report.fault.language, report.fault.raw_message
    );

    if let Some(selected) = &report.selected_file {
        prompt.push_str(&format!("\nResolved source file: {}\n", selected.path));
    }
    if let Some(context) = &report.code_context {
        prompt.push_str("\nCode around the failure:\n");
        for line in &context.snippet {
            let marker = if line.is_error_line { ">>" } else { "  " };
            prompt.push_str(&format!("{} {:>5} {}\n", marker, line.line_number, line.content));
        }
        if !context.insights.is_empty() {
            prompt.push_str(&format!(
                "\nStatic observations:\n- {}\n",
                context.insights.join("\n- ")
            ));
        }
    }
    prompt.push_str(&format!(
        "\nRule-based causes:\n- {}\n",
        report.possible_causes.join("\n- ")
    ));

    prompt
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
            Err(anyhow!("unavailable"))
        }
    }

    #[tokio::test]
    async fn test_prompt_contains_fault_and_causes() {
        let outcome = AnalysisEngine::new(Arc::new(NoRepository))
            .analyze("System.LimitException: Too many SOQL queries: 101")
            .await
            .unwrap();

        let prompt = render_prompt(&outcome);
        assert!(prompt.contains("LimitException"));
        assert!(prompt.contains("Rule-based causes:"));
        assert!(prompt.contains("Too many SOQL queries"));
    }
}
