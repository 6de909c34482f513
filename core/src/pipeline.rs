//! Analysis Pipeline Module
//!
//! Sequences the core stages for one raw error message: parse, resolve
//! against the repository tree, fetch the top candidate's content, extract
//! code context, recommend, classify. Every external failure degrades to a
//! context-poorer but still complete report; the only caller-visible error
//! is a blank input message.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classification::{classify, Classification};
use crate::{code_context, file_resolver, recommendation};
use crate::{DiagnosticReport, FaultParser, FileCandidate, RepoEntry};

/// Errors surfaced to callers of [`AnalysisEngine::analyze`]
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("error message is empty")]
    EmptyMessage,
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Source of repository data the pipeline depends on but does not implement
///
/// Both calls return one deterministic result; there is no streaming or
/// partial-result contract. Implementations may cache internally.
#[async_trait]
pub trait RepositoryReader: Send + Sync {
    /// Flat listing of the repository tree
    async fn list_tree(&self) -> anyhow::Result<Vec<RepoEntry>>;

    /// Full text of one file by repository-relative path
    async fn fetch_file(&self, path: &str) -> anyhow::Result<String>;
}

/// One completed analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Unique identifier for this analysis run
    pub id: Uuid,
    /// When the analysis completed
    pub created_at: DateTime<Utc>,
    /// All candidates the resolver produced, ordered by tier
    pub candidates: Vec<FileCandidate>,
    pub classification: Classification,
    pub report: DiagnosticReport,
}

/// Engine running the error-to-diagnosis pipeline
///
/// Holds no mutable state; concurrent analyses need no coordination.
pub struct AnalysisEngine {
    parser: FaultParser,
    repository: Arc<dyn RepositoryReader>,
}

impl AnalysisEngine {
    /// Create an engine reading repository data through `repository`
    pub fn new(repository: Arc<dyn RepositoryReader>) -> Self {
        AnalysisEngine {
            parser: FaultParser::new(),
            repository,
        }
    }

    /// Run the full pipeline for one raw error message
    ///
    /// Fails only on blank input. Repository fetch failures are logged and
    /// degrade to a report without file context.
    pub async fn analyze(&self, raw_message: &str) -> Result<AnalysisOutcome> {
        if raw_message.trim().is_empty() {
            return Err(AnalysisError::EmptyMessage);
        }

        let fault = self.parser.parse(raw_message);
        info!(
            fault_type = %fault.fault_type,
            language = %fault.language,
            "parsed fault record"
        );

        let candidates = match self.repository.list_tree().await {
            Ok(tree) => file_resolver::resolve(&fault, &tree),
            Err(e) => {
                warn!("repository tree listing failed, continuing without file context: {}", e);
                Vec::new()
            }
        };

        // Content is fetched for the top candidate only.
        let context = match candidates.first() {
            Some(candidate) => match self.repository.fetch_file(&candidate.path).await {
                Ok(content) => code_context::extract(&content, fault.line_number, &fault),
                Err(e) => {
                    warn!(path = %candidate.path, "file content fetch failed: {}", e);
                    None
                }
            },
            None => None,
        };
        debug!(
            candidates = candidates.len(),
            has_context = context.is_some(),
            "resolution stage complete"
        );

        let mut report = recommendation::recommend(&fault, context);
        report.selected_file = candidates.first().cloned();

        let classification = classify(&report.fault.fault_type);

        Ok(AnalysisOutcome {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            candidates,
            classification,
            report,
        })
    }
}
