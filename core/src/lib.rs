//! Faultline Core Module
//!
//! The core module implements the error-to-diagnosis pipeline: fault parsing,
//! repository file resolution, code context extraction, and the rule-based
//! recommendation engine. Everything here is pure CPU work; the only async
//! seam is the [`pipeline::RepositoryReader`] trait the orchestrator calls.

use serde::{Deserialize, Serialize};

pub mod classification;
pub mod code_context;
pub mod fault_parser;
pub mod file_resolver;
pub mod pipeline;
pub mod recommendation;

pub use classification::{classify, Category, Classification, Severity};
pub use fault_parser::FaultParser;
pub use pipeline::{AnalysisEngine, AnalysisError, AnalysisOutcome, RepositoryReader};

/// Source language inferred from an error message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Apex,
    Javascript,
    Java,
    Python,
    Unknown,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::Apex => "apex",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Python => "python",
            Language::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One frame captured from a JavaScript-style stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Function name as it appears in the trace
    pub function: String,
    /// File the frame points at
    pub file: String,
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
}

/// Structured result of parsing one raw error message
///
/// Fields that no pattern matched stay `None`; `fault_type` falls back to
/// `"Unknown"`. A record with only `raw_message` and `fault_type` populated
/// is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    /// Original message exactly as received
    pub raw_message: String,
    /// Exception/error type, e.g. `NullPointerException`, or `Unknown`
    pub fault_type: String,
    /// Message text captured after the exception type, if any
    pub message: Option<String>,
    /// Inferred source language
    pub language: Language,
    /// File name mentioned by the message
    pub file_name: Option<String>,
    /// Apex class name from a `Class.X.Y: line N` location
    pub class_name: Option<String>,
    /// Method name from an Apex location
    pub method_name: Option<String>,
    /// 1-based fault line number
    pub line_number: Option<u32>,
    /// 1-based fault column number
    pub column_number: Option<u32>,
    /// All stack frames found in the message, in order of appearance
    pub stack_frames: Vec<StackFrame>,
}

impl FaultRecord {
    /// Record for a message no pattern matched
    pub fn unknown(raw_message: impl Into<String>) -> Self {
        FaultRecord {
            raw_message: raw_message.into(),
            fault_type: "Unknown".to_string(),
            message: None,
            language: Language::Unknown,
            file_name: None,
            class_name: None,
            method_name: None,
            line_number: None,
            column_number: None,
            stack_frames: Vec::new(),
        }
    }
}

/// Kind of a repository tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoEntryKind {
    Blob,
    Tree,
}

/// One entry from a flat repository tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    /// Repository-relative path
    pub path: String,
    /// Entry kind; only blobs are file candidates
    #[serde(rename = "type")]
    pub kind: RepoEntryKind,
}

impl RepoEntry {
    pub fn is_file(&self) -> bool {
        self.kind == RepoEntryKind::Blob
    }
}

/// A ranked file match produced by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// Repository-relative path of the matched file
    pub path: String,
    /// 1 = file-name match, 2 = class-name match, 3 = method-name match
    pub priority_tier: u8,
    /// Human-readable justification for the match
    pub reason: String,
}

/// One line of the extracted source snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetLine {
    /// 1-based line number in the source file
    pub line_number: u32,
    pub content: String,
    /// True for the line the fault points at
    pub is_error_line: bool,
}

/// Code-level context derived from one file and one fault line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeContext {
    /// Window of `error_line +/- 5`, clipped to the file bounds
    pub snippet: Vec<SnippetLine>,
    /// Identifiers on the error line, minus language keywords
    pub variables_used: Vec<String>,
    /// Identifiers on the error line immediately followed by `(`
    pub method_calls: Vec<String>,
    /// True when the error line contains an explicit null comparison
    pub has_null_check: bool,
    /// Heuristic observations, ordered for report readability
    pub insights: Vec<String>,
}

/// Final diagnostic output for one fault
///
/// Constructed once per analysis and never mutated afterwards. The guidance
/// vectors are always non-empty; unrecognized fault types get the generic
/// fallback set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub fault: FaultRecord,
    /// Top-ranked candidate the context was extracted from, if any
    pub selected_file: Option<FileCandidate>,
    pub code_context: Option<CodeContext>,
    pub possible_causes: Vec<String>,
    pub suggested_fixes: Vec<String>,
    pub best_practices: Vec<String>,
    /// Longer prose explanation when one exists for the fault type
    pub root_cause_narrative: Option<String>,
}
