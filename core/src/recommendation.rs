//! Recommendation Engine Module
//!
//! Maps a parsed fault (plus optional code context) to structured guidance:
//! possible causes, suggested fixes, and best practices. Dispatch is a total
//! mapping over [`FaultKind`]; adding a fault type means adding an enum
//! variant and a template function, not new control flow. Every path returns
//! non-empty guidance, including the generic fallback for unknown types.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{CodeContext, DiagnosticReport, FaultRecord, Language};

/// Salesforce record IDs are exactly 15 or 18 characters.
const VALID_ID_LENGTHS: [usize; 2] = [15, 18];

/// Apex ID validation utility included in StringException prevention text
const ID_VALIDATION_EXAMPLE: &str = "static Boolean isValidId(String value) { \
     return value != null && (value.length() == 15 || value.length() == 18) \
     && value.isAlphanumeric(); }";

/// Recognized fault types, parsed from the fault-type string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    NullPointer,
    Dml,
    Limit,
    Type,
    Reference,
    Syntax,
    StringCast,
    Query,
    Other,
}

impl FaultKind {
    /// Total mapping from the parser's fault-type string
    pub fn from_type(fault_type: &str) -> Self {
        match fault_type {
            "NullPointerException" => FaultKind::NullPointer,
            "DmlException" => FaultKind::Dml,
            "LimitException" => FaultKind::Limit,
            "TypeError" => FaultKind::Type,
            "ReferenceError" => FaultKind::Reference,
            "SyntaxError" => FaultKind::Syntax,
            "StringException" => FaultKind::StringCast,
            "QueryException" => FaultKind::Query,
            _ => FaultKind::Other,
        }
    }
}

/// Guidance produced by one template
struct Guidance {
    causes: Vec<String>,
    fixes: Vec<String>,
    practices: Vec<String>,
    narrative: String,
}

/// Produce the diagnostic report for one fault
///
/// Always succeeds; the guidance vectors are never empty. The caller attaches
/// the selected file candidate afterwards.
pub fn recommend(fault: &FaultRecord, context: Option<CodeContext>) -> DiagnosticReport {
    let kind = FaultKind::from_type(&fault.fault_type);

    let mut guidance = match kind {
        FaultKind::NullPointer => null_pointer_guidance(fault, context.as_ref()),
        FaultKind::Dml => dml_guidance(fault),
        FaultKind::Limit => limit_guidance(fault),
        FaultKind::Type => type_error_guidance(fault),
        FaultKind::Reference => reference_error_guidance(fault),
        FaultKind::Syntax => syntax_error_guidance(fault),
        FaultKind::StringCast => string_exception_guidance(fault),
        FaultKind::Query => query_exception_guidance(fault),
        FaultKind::Other => generic_guidance(fault),
    };

    if fault.language == Language::Apex {
        guidance.practices.extend(apex_practices());
    }

    DiagnosticReport {
        fault: fault.clone(),
        selected_file: None,
        code_context: context,
        possible_causes: guidance.causes,
        suggested_fixes: guidance.fixes,
        best_practices: guidance.practices,
        root_cause_narrative: Some(guidance.narrative),
    }
}

fn null_pointer_guidance(fault: &FaultRecord, context: Option<&CodeContext>) -> Guidance {
    let location = location_phrase(fault);

    let mut fixes = vec![
        format!("Add a null check before the dereference {}", location),
        "Initialize the object before first use, or use a safe-navigation operator (?.)".to_string(),
        "Verify that upstream queries actually returned a record before accessing its fields"
            .to_string(),
    ];
    if let Some(ctx) = context {
        if !ctx.has_null_check {
            fixes.push(
                "The failing line has no null comparison; guard each dereferenced object explicitly"
                    .to_string(),
            );
        }
    }

    Guidance {
        causes: vec![
            "A variable or object field is used before it was assigned".to_string(),
            "A query or map lookup returned no result and the code assumed one".to_string(),
            "An optional relationship field (for example Owner or Parent) is empty on this record"
                .to_string(),
        ],
        fixes,
        practices: vec![
            "Check for null immediately after any lookup that can legitimately return nothing"
                .to_string(),
            "Prefer early returns over deeply nested null guards".to_string(),
            "Unit-test the empty-result path, not only the happy path".to_string(),
        ],
        narrative: format!(
            "The runtime dereferenced a null object {}. Something the code assumed was always \
             populated was not; trace the variable back to its assignment and cover the case \
             where it stays empty.",
            location
        ),
    }
}

fn dml_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            "A validation rule or required field rejected the DML operation".to_string(),
            "A trigger or flow on the target object threw during the save".to_string(),
            "The record being updated was deleted or is locked by another transaction".to_string(),
            "Field-level security or sharing rules blocked the write".to_string(),
        ],
        fixes: vec![
            "Read the DML error detail: it names the field and the rule that rejected the save"
                .to_string(),
            "Populate all required fields before insert or update".to_string(),
            "Use Database.insert with allOrNone=false when partial success is acceptable"
                .to_string(),
        ],
        practices: vec![
            "Wrap DML in try/catch and surface the DmlException message to the caller".to_string(),
            "Validate records in memory before committing them".to_string(),
            "Keep DML out of loops; collect records and commit once".to_string(),
        ],
        narrative: format!(
            "A database write {} was rejected by the platform. The exception detail carries the \
             failing field and rule; fix the data or the automation that rejected it rather than \
             retrying blindly.",
            location_phrase(fault)
        ),
    }
}

fn limit_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            "A SOQL query or DML statement executes inside a loop".to_string(),
            "The transaction touches too many records for synchronous processing".to_string(),
            "Recursive trigger execution multiplies resource consumption".to_string(),
            "CPU-heavy processing runs on the request thread instead of asynchronously"
                .to_string(),
        ],
        fixes: vec![
            "Move queries and DML out of loops; query once into a map and iterate in memory"
                .to_string(),
            "Process large volumes with Batch Apex or Queueable jobs".to_string(),
            "Add a static guard against recursive trigger re-entry".to_string(),
            "Use Limits methods to check remaining capacity before expensive operations"
                .to_string(),
        ],
        practices: vec![
            "Bulkify every trigger and service method from the start".to_string(),
            "Test with 200-record batches, the platform's trigger chunk size".to_string(),
            "Monitor governor limit consumption in debug logs during load testing".to_string(),
        ],
        narrative: format!(
            "The transaction {} exhausted a governor limit. This is almost always a query or DML \
             statement inside a loop; bulkify the code path so resource use stays constant as \
             record volume grows.",
            location_phrase(fault)
        ),
    }
}

fn type_error_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            "A property or method is accessed on an undefined or null value".to_string(),
            "A function received an argument of an unexpected type".to_string(),
            "An API response shape changed and the code still expects the old one".to_string(),
        ],
        fixes: vec![
            "Guard the access with optional chaining (?.) or an explicit undefined check"
                .to_string(),
            "Log the offending value right before the failing line to see its actual shape"
                .to_string(),
            "Validate external data against the expected schema at the boundary".to_string(),
        ],
        practices: vec![
            "Normalize API responses into known shapes as soon as they arrive".to_string(),
            "Prefer strict equality and explicit conversions over implicit coercion".to_string(),
            "Add types (TypeScript or JSDoc) to catch shape mismatches before runtime"
                .to_string(),
        ],
        narrative: format!(
            "A value {} did not have the type or shape the code expected, most often an \
             undefined intermediate in a property chain. Confirm what the value actually is at \
             that point and guard the access.",
            location_phrase(fault)
        ),
    }
}

fn reference_error_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            "An identifier is used before it is declared or outside its scope".to_string(),
            "A variable name is misspelled".to_string(),
            "A script or module that defines the identifier did not load".to_string(),
        ],
        fixes: vec![
            "Check the spelling and declaration point of the named identifier".to_string(),
            "Verify import statements and script load order".to_string(),
            "Declare variables with let/const in the scope where they are used".to_string(),
        ],
        practices: vec![
            "Enable linting; no-undef catches these before deployment".to_string(),
            "Avoid implicit globals; every variable gets an explicit declaration".to_string(),
            "Keep module boundaries explicit with import/export".to_string(),
        ],
        narrative: format!(
            "The runtime could not resolve an identifier {}. This is a scoping, spelling, or \
             load-order problem rather than a data problem.",
            location_phrase(fault)
        ),
    }
}

fn syntax_error_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            "Unbalanced brackets, braces, or quotes near the reported location".to_string(),
            "A reserved word is used as an identifier".to_string(),
            "Code written for a newer language version runs on an older runtime".to_string(),
        ],
        fixes: vec![
            "Inspect the line before the reported one; the real mistake usually sits there"
                .to_string(),
            "Re-indent the block so mismatched braces become visible".to_string(),
            "Run the file through the language's own parser or linter for a precise location"
                .to_string(),
        ],
        practices: vec![
            "Format code automatically on save".to_string(),
            "Keep functions short so bracket mismatches stay local".to_string(),
            "Gate merges on a compile or lint step".to_string(),
        ],
        narrative: format!(
            "The source failed to parse {}. Syntax errors are frequently reported one line after \
             the actual mistake; scan backwards for the unbalanced construct.",
            location_phrase(fault)
        ),
    }
}

fn string_exception_guidance(fault: &FaultRecord) -> Guidance {
    let mut causes = vec![
        "A string was cast to an ID or typed value it cannot represent".to_string(),
        "User or integration input reached an ID field without validation".to_string(),
    ];
    let mut fixes = vec![
        "Validate the string before casting it to an Id".to_string(),
        "Use Id.valueOf inside try/catch when the source is untrusted".to_string(),
    ];
    let mut practices = vec![
        format!(
            "Centralize ID validation in a utility, for example: {}",
            ID_VALIDATION_EXAMPLE
        ),
        "Treat every external identifier as untrusted until checked".to_string(),
    ];

    let narrative = if let Some(invalid_id) = extract_invalid_id(fault) {
        let length = invalid_id.chars().count();
        causes.insert(
            0,
            format!(
                "The value '{}' is not a valid Salesforce record ID: it is {} characters long, \
                 and valid IDs are exactly {} or {} characters",
                invalid_id, length, VALID_ID_LENGTHS[0], VALID_ID_LENGTHS[1]
            ),
        );
        fixes.insert(
            0,
            format!(
                "Reject or correct '{}' before the cast; check length and alphanumeric content \
                 first",
                invalid_id
            ),
        );
        format!(
            "A string-to-ID conversion failed on the literal '{}' ({} characters). Salesforce \
             record IDs are exactly 15 or 18 alphanumeric characters, so this value can never \
             be a record ID; find where it enters the system and validate it there.",
            invalid_id, length
        )
    } else {
        format!(
            "A string operation failed {}, most commonly an invalid cast to Id. Validate string \
             content before converting it to typed values.",
            location_phrase(fault)
        )
    };

    Guidance {
        causes,
        fixes,
        practices,
        narrative,
    }
}

fn query_exception_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            "A query expected exactly one row and got zero or several".to_string(),
            "A dynamic SOQL string is malformed or references a missing field".to_string(),
            "The running user lacks access to a queried object or field".to_string(),
        ],
        fixes: vec![
            "Assign query results to a List and check its size instead of a single SObject"
                .to_string(),
            "Log the final query string before executing dynamic SOQL".to_string(),
            "Confirm field and object permissions for the running user".to_string(),
        ],
        practices: vec![
            "Never assume a query returns a row; handle the empty list explicitly".to_string(),
            "Bind variables instead of concatenating user input into SOQL".to_string(),
            "Limit queried fields to the ones actually used".to_string(),
        ],
        narrative: format!(
            "A query {} failed at runtime, typically a single-row assignment that found no rows \
             or a malformed dynamic query. Make the empty result a handled case.",
            location_phrase(fault)
        ),
    }
}

fn generic_guidance(fault: &FaultRecord) -> Guidance {
    Guidance {
        causes: vec![
            format!(
                "The error type '{}' has no specific rule; the message itself is the best lead",
                fault.fault_type
            ),
            "An unhandled edge case or unexpected input reached this code path".to_string(),
            "An external dependency returned something the code did not anticipate".to_string(),
        ],
        fixes: vec![
            "Reproduce the failure with the exact input from the error report".to_string(),
            "Add logging around the failing operation to narrow the trigger".to_string(),
            "Search the codebase for the literal error message to find the throw site"
                .to_string(),
        ],
        practices: vec![
            "Fail with specific exception types so future reports classify cleanly".to_string(),
            "Keep error messages actionable: include the offending value and location"
                .to_string(),
            "Add a regression test once the cause is found".to_string(),
        ],
        narrative: format!(
            "No specific diagnosis rule matched the error type '{}'. Start from the raw message \
             and the code location it references.",
            fault.fault_type
        ),
    }
}

/// Fixed Apex additions appended for any fault in Apex code
fn apex_practices() -> Vec<String> {
    vec![
        "Bulkify all trigger logic; assume 200 records per invocation".to_string(),
        "Keep SOQL and DML out of loops".to_string(),
        "Use one trigger per object delegating to a handler class".to_string(),
        "Write unit tests that cover bulk and negative paths, not just single records"
            .to_string(),
    ]
}

/// `line N of Class.method` style phrase for narrative interpolation
fn location_phrase(fault: &FaultRecord) -> String {
    let place = match (&fault.class_name, &fault.method_name) {
        (Some(class), Some(method)) => Some(format!("{}.{}", class, method)),
        (Some(class), None) => Some(class.clone()),
        (None, _) => fault.file_name.clone(),
    };

    match (place, fault.line_number) {
        (Some(place), Some(line)) => format!("at line {} of {}", line, place),
        (Some(place), None) => format!("in {}", place),
        (None, Some(line)) => format!("at line {}", line),
        (None, None) => "at an unknown location".to_string(),
    }
}

/// Pull the literal invalid-ID value out of an `Invalid id: X` message
fn extract_invalid_id(fault: &FaultRecord) -> Option<String> {
    let pattern = Regex::new(r"Invalid id:\s*([A-Za-z0-9]+)")
        .expect("hard-coded invalid-id pattern must compile");

    pattern
        .captures(&fault.raw_message)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaultParser;

    fn fault_of_type(fault_type: &str) -> FaultRecord {
        FaultRecord {
            fault_type: fault_type.to_string(),
            ..FaultRecord::unknown("test")
        }
    }

    #[test]
    fn test_every_kind_yields_non_empty_guidance() {
        let types = [
            "NullPointerException",
            "DmlException",
            "LimitException",
            "TypeError",
            "ReferenceError",
            "SyntaxError",
            "StringException",
            "QueryException",
            "Unknown",
            "SomethingNeverSeen",
        ];

        for fault_type in types {
            let report = recommend(&fault_of_type(fault_type), None);
            assert!(!report.possible_causes.is_empty(), "{}", fault_type);
            assert!(!report.suggested_fixes.is_empty(), "{}", fault_type);
            assert!(!report.best_practices.is_empty(), "{}", fault_type);
            assert!(report.root_cause_narrative.is_some(), "{}", fault_type);
        }
    }

    #[test]
    fn test_invalid_id_specialization_reports_literal_and_length() {
        let fault = FaultParser::new().parse(
            "Exception Message: Invalid id: 12312312312\n\
             Exception Type: System.StringException\n\
             Stack Trace: Class.AccountTriggerHandler.handleTrigger: line 16, column 1",
        );
        let report = recommend(&fault, None);

        let all_text = format!(
            "{} {} {}",
            report.possible_causes.join(" "),
            report.suggested_fixes.join(" "),
            report.root_cause_narrative.clone().unwrap_or_default()
        );
        assert!(all_text.contains("12312312312"));
        assert!(all_text.contains("11 characters"));
        assert!(all_text.contains("15 or 18"));
        assert!(report
            .best_practices
            .iter()
            .any(|practice| practice.contains("isValidId")));
    }

    #[test]
    fn test_apex_language_appends_fixed_practices() {
        let mut fault = fault_of_type("NullPointerException");
        fault.language = Language::Apex;
        let apex_report = recommend(&fault, None);

        fault.language = Language::Javascript;
        let js_report = recommend(&fault, None);

        assert!(apex_report.best_practices.len() > js_report.best_practices.len());
        assert!(apex_report
            .best_practices
            .iter()
            .any(|practice| practice.contains("Bulkify")));
    }

    #[test]
    fn test_unknown_type_uses_generic_fallback() {
        let report = recommend(&fault_of_type("WeirdVendorFault"), None);

        assert!(report
            .possible_causes
            .iter()
            .any(|cause| cause.contains("WeirdVendorFault")));
    }

    #[test]
    fn test_recommend_is_idempotent() {
        let fault = fault_of_type("LimitException");
        assert_eq!(recommend(&fault, None), recommend(&fault, None));
    }

    #[test]
    fn test_null_pointer_fix_reacts_to_missing_guard() {
        let fault = fault_of_type("NullPointerException");
        let context = crate::code_context::extract("account.Name = x;", Some(1), &fault);
        let report = recommend(&fault, context);

        assert!(report
            .suggested_fixes
            .iter()
            .any(|fix| fix.contains("no null comparison")));
    }
}
