//! Code Context Extractor Module
//!
//! Given one file's content and a fault line, extracts a bounded snippet
//! around the line and runs lightweight, regex-level inspection of the line
//! itself: identifier and call extraction, null-check detection, query and
//! loop detection. The inspection feeds fault-type-specific insight strings;
//! every insight is deterministic for identical input.

use regex::Regex;

use crate::{CodeContext, FaultRecord, SnippetLine};

/// Lines included on each side of the error line
const WINDOW: u32 = 5;

/// Control-flow and declaration keywords excluded from `variables_used`
const KEYWORD_STOPLIST: &[&str] = &[
    "if", "else", "for", "while", "do", "return", "new", "class", "public", "private",
    "protected", "static", "final", "void", "var", "let", "const", "function", "this",
    "true", "false", "null", "try", "catch", "finally", "throw", "switch", "case", "break",
    "continue",
];

const IDENTIFIER: &str = r"[A-Za-z_$][A-Za-z0-9_$]*";
const METHOD_CALL: &str = r"([A-Za-z_$][A-Za-z0-9_$]*)\s*\(";
const NULL_CHECK: &str = r"!==?\s*null|null\s*!==?";
const DEREFERENCE: &str = r"([A-Za-z_$][A-Za-z0-9_$]*)\s*\.";
const SOQL_QUERY: &str = r"\[\s*(?i:SELECT)\b|Database\.query\s*\(";
const LOOP_HEADER: &str = r"\b(?:for|while)\s*\(";

/// Extract code context for one fault location
///
/// Returns `None` when the fault has no line number or the file is empty.
pub fn extract(
    file_content: &str,
    error_line: Option<u32>,
    fault: &FaultRecord,
) -> Option<CodeContext> {
    let error_line = error_line?;
    if file_content.is_empty() {
        return None;
    }

    let lines: Vec<&str> = file_content.lines().collect();
    let snippet = snippet_window(&lines, error_line);

    let error_text = lines
        .get(error_line.saturating_sub(1) as usize)
        .map(|line| line.trim())
        .unwrap_or("");

    let variables_used = extract_identifiers(error_text);
    let method_calls = extract_method_calls(error_text);
    let has_null_check = pattern(NULL_CHECK).is_match(error_text);
    let insights = generate_insights(error_text, has_null_check, fault);

    Some(CodeContext {
        snippet,
        variables_used,
        method_calls,
        has_null_check,
        insights,
    })
}

/// Window of `error_line +/- WINDOW`, clipped to the file bounds
fn snippet_window(lines: &[&str], error_line: u32) -> Vec<SnippetLine> {
    let first = error_line.saturating_sub(WINDOW).max(1);
    let last = (error_line + WINDOW).min(lines.len() as u32);

    (first..=last)
        .filter_map(|number| {
            lines.get((number - 1) as usize).map(|content| SnippetLine {
                line_number: number,
                content: (*content).to_string(),
                is_error_line: number == error_line,
            })
        })
        .collect()
}

/// Identifier tokens on the line, deduplicated in order of appearance,
/// minus the keyword stoplist
fn extract_identifiers(line: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for found in pattern(IDENTIFIER).find_iter(line) {
        let token = found.as_str();
        if KEYWORD_STOPLIST.contains(&token) {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

/// Identifiers immediately followed by `(`
fn extract_method_calls(line: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in pattern(METHOD_CALL).captures_iter(line) {
        let Some(name) = caps.get(1) else { continue };
        let token = name.as_str();
        if KEYWORD_STOPLIST.contains(&token) {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

/// Fault-type-aware line heuristics; several insights can fire on one line
fn generate_insights(error_text: &str, has_null_check: bool, fault: &FaultRecord) -> Vec<String> {
    let mut insights = Vec::new();

    if fault.fault_type == "NullPointerException" {
        if error_text.contains('.') && !has_null_check {
            let receivers = dereferenced_objects(error_text);
            if !receivers.is_empty() {
                insights.push(format!(
                    "Line dereferences {} without a guard; any of these being null raises the exception",
                    receivers.join(", ")
                ));
            }
            insights.push("No null check found on this line".to_string());
        }
        if error_text.contains('[') && error_text.contains(']') {
            insights.push(
                "Line accesses a list or array element; an out-of-bounds index or null collection fails here"
                    .to_string(),
            );
        }
    }

    if pattern(SOQL_QUERY).is_match(error_text) {
        insights.push("SOQL query executes on this line".to_string());
        if fault.fault_type == "LimitException" {
            insights.push(
                "Query runs inside the failing path; if this sits in a loop it will exhaust the SOQL governor limit"
                    .to_string(),
            );
        }
    }

    if pattern(LOOP_HEADER).is_match(error_text) {
        insights.push("Loop starts on this line".to_string());
        if fault.fault_type == "LimitException" {
            insights.push(
                "Bulkify this loop: move queries and DML out of the loop body and operate on collections"
                    .to_string(),
            );
        }
    }

    insights
}

/// Identifiers appearing directly before a `.` on the line
fn dereferenced_objects(line: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in pattern(DEREFERENCE).captures_iter(line) {
        let Some(name) = caps.get(1) else { continue };
        let token = name.as_str();
        if KEYWORD_STOPLIST.contains(&token) {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

fn pattern(src: &str) -> Regex {
    // All patterns are compile-time constants.
    Regex::new(src).expect("hard-coded context pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaultRecord;

    fn numbered_file(lines: u32) -> String {
        (1..=lines)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn fault_of_type(fault_type: &str) -> FaultRecord {
        FaultRecord {
            fault_type: fault_type.to_string(),
            ..FaultRecord::unknown("test")
        }
    }

    #[test]
    fn test_window_covers_eleven_lines_mid_file() {
        let content = numbered_file(100);
        let context = extract(&content, Some(45), &fault_of_type("Unknown")).unwrap();

        assert_eq!(context.snippet.len(), 11);
        assert_eq!(context.snippet.first().unwrap().line_number, 40);
        assert_eq!(context.snippet.last().unwrap().line_number, 50);
        for line in &context.snippet {
            assert_eq!(line.is_error_line, line.line_number == 45);
        }
    }

    #[test]
    fn test_window_clips_at_file_start() {
        let content = numbered_file(100);
        let context = extract(&content, Some(2), &fault_of_type("Unknown")).unwrap();

        assert_eq!(context.snippet.first().unwrap().line_number, 1);
        assert_eq!(context.snippet.last().unwrap().line_number, 7);
    }

    #[test]
    fn test_window_clips_at_file_end() {
        let content = numbered_file(10);
        let context = extract(&content, Some(9), &fault_of_type("Unknown")).unwrap();

        assert_eq!(context.snippet.first().unwrap().line_number, 4);
        assert_eq!(context.snippet.last().unwrap().line_number, 10);
    }

    #[test]
    fn test_missing_line_or_empty_file_yield_none() {
        assert!(extract("content", None, &fault_of_type("Unknown")).is_none());
        assert!(extract("", Some(3), &fault_of_type("Unknown")).is_none());
    }

    #[test]
    fn test_identifier_extraction_skips_keywords() {
        let content = "if (account.Name != null) { return account.Name; }";
        let context = extract(content, Some(1), &fault_of_type("Unknown")).unwrap();

        assert!(context.variables_used.contains(&"account".to_string()));
        assert!(context.variables_used.contains(&"Name".to_string()));
        assert!(!context.variables_used.contains(&"if".to_string()));
        assert!(!context.variables_used.contains(&"return".to_string()));
        assert!(context.has_null_check);
    }

    #[test]
    fn test_method_call_extraction() {
        let content = "result = handler.processAccount(accountId);";
        let context = extract(content, Some(1), &fault_of_type("Unknown")).unwrap();

        assert_eq!(context.method_calls, vec!["processAccount".to_string()]);
    }

    #[test]
    fn test_null_pointer_insights_without_guard() {
        let content = "account.Owner.Name = newName;";
        let context = extract(content, Some(1), &fault_of_type("NullPointerException")).unwrap();

        assert!(context.insights[0].contains("account"));
        assert!(context
            .insights
            .iter()
            .any(|insight| insight.contains("No null check")));
    }

    #[test]
    fn test_null_pointer_insight_suppressed_by_guard() {
        let content = "if (account != null) account.process();";
        let context = extract(content, Some(1), &fault_of_type("NullPointerException")).unwrap();

        assert!(context.has_null_check);
        assert!(!context
            .insights
            .iter()
            .any(|insight| insight.contains("No null check")));
    }

    #[test]
    fn test_limit_exception_query_in_loop_insights() {
        let content = "for (Account a : accounts) { List<Contact> c = [SELECT Id FROM Contact]; }";
        let context = extract(content, Some(1), &fault_of_type("LimitException")).unwrap();

        assert!(context
            .insights
            .iter()
            .any(|insight| insight.contains("SOQL query executes")));
        assert!(context
            .insights
            .iter()
            .any(|insight| insight.contains("governor limit")));
        assert!(context
            .insights
            .iter()
            .any(|insight| insight.contains("Bulkify")));
    }

    #[test]
    fn test_database_query_call_detected() {
        let content = "List<SObject> rows = Database.query(soql);";
        let context = extract(content, Some(1), &fault_of_type("QueryException")).unwrap();

        assert!(context
            .insights
            .iter()
            .any(|insight| insight.contains("SOQL query executes")));
    }
}
