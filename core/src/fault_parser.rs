//! Fault Parser Module
//!
//! Converts a free-text error message into a structured [`FaultRecord`].
//! Parsing is a fixed, prioritized list of named rules; each rule only fills
//! fields that are still unset, so the first rule family to match a field
//! wins. Parsing never fails: a message nothing matches comes back as
//! `fault_type = "Unknown"` with every optional field unset.

use regex::Regex;
use tracing::debug;

use crate::{FaultRecord, Language, StackFrame};

/// Identifier ending in `Exception`/`Error`, followed by a colon and message.
const EXCEPTION_WITH_MESSAGE: &str =
    r"(?:([A-Za-z]\w*)\.)?([A-Za-z]\w*(?:Exception|Error))\s*:\s*([^\r\n]+)";

/// Namespaced exception mention with no trailing message, e.g. a
/// `System.StringException` on its own line. The namespace is mandatory here
/// so the bare word `Exception` in prose cannot match.
const EXCEPTION_BARE: &str = r"([A-Za-z]\w*)\.([A-Za-z]\w*(?:Exception|Error))\b";

/// Apex stack location: `Class.<ClassName>[.<method>]: line N[, column M]`.
const APEX_LOCATION: &str =
    r"Class\.([A-Za-z_]\w*)(?:\.([A-Za-z_]\w*))?\s*:\s*line\s+(\d+)(?:,\s*column\s+(\d+))?";

/// JavaScript stack frame: `at <fn> (<file>:<line>:<col>)`.
const STACK_FRAME: &str = r"at\s+([^\s()]+)\s*\(([^():]+):(\d+):(\d+)\)";

/// Mention of a file with a known source extension, with an optional `:line`.
const FILE_REFERENCE: &str =
    r"([A-Za-z0-9_][A-Za-z0-9_./\\-]*\.(cls|trigger|apex|js|java|py))\b(?::(\d+))?";

/// Ordered substring fallback for the fault type. First hit wins. This is a
/// deliberately blunt heuristic inherited from the source system: a message
/// that merely mentions one of these words in prose gets classified by it.
const TYPE_KEYWORDS: &[(&str, &str)] = &[
    ("TypeError", "TypeError"),
    ("ReferenceError", "ReferenceError"),
    ("SyntaxError", "SyntaxError"),
    ("NullPointerException", "NullPointerException"),
    ("null is not", "NullPointerException"),
    ("undefined", "TypeError"),
    ("DmlException", "DmlException"),
    ("LimitException", "LimitException"),
];

type RuleFn = fn(&FaultParser, &str, &mut FaultRecord);

/// Rule evaluation order. Keep this list in sync with the documented
/// priority: exception type, Apex location, JS stack, generic file
/// reference, keyword fallback.
const RULES: &[(&str, RuleFn)] = &[
    ("exception-type", FaultParser::apply_exception_type),
    ("apex-location", FaultParser::apply_apex_location),
    ("stack-frames", FaultParser::apply_stack_frames),
    ("file-reference", FaultParser::apply_file_reference),
    ("keyword-fallback", FaultParser::apply_keyword_fallback),
];

/// Parser holding the compiled pattern set
pub struct FaultParser {
    exception_with_message: Regex,
    exception_bare: Regex,
    apex_location: Regex,
    stack_frame: Regex,
    file_reference: Regex,
}

impl FaultParser {
    /// Create a parser with all patterns compiled
    pub fn new() -> Self {
        FaultParser {
            exception_with_message: compile(EXCEPTION_WITH_MESSAGE),
            exception_bare: compile(EXCEPTION_BARE),
            apex_location: compile(APEX_LOCATION),
            stack_frame: compile(STACK_FRAME),
            file_reference: compile(FILE_REFERENCE),
        }
    }

    /// Parse one raw error message into a fault record
    ///
    /// Never fails; unmatched fields stay unset.
    pub fn parse(&self, raw_message: &str) -> FaultRecord {
        let mut record = FaultRecord::unknown(raw_message);

        for (name, rule) in RULES.iter().copied() {
            rule(self, raw_message, &mut record);
            debug!(rule = name, fault_type = %record.fault_type, "parse rule applied");
        }

        record
    }

    /// Rule 1: exception type and trailing message
    ///
    /// Tries the colon-and-message form first; falls back to a namespaced
    /// mention with no message (the shape a ServiceNow-style
    /// `Exception Type: System.X` field produces).
    fn apply_exception_type(&self, message: &str, record: &mut FaultRecord) {
        if let Some(caps) = self.exception_with_message.captures(message) {
            if let Some(fault_type) = caps.get(2) {
                record.fault_type = fault_type.as_str().to_string();
            }
            record.message = caps.get(3).map(|m| m.as_str().trim().to_string());
        } else if let Some(caps) = self.exception_bare.captures(message) {
            if let Some(fault_type) = caps.get(2) {
                record.fault_type = fault_type.as_str().to_string();
            }
        }
    }

    /// Rule 2: Apex `Class.X.Y: line N, column M` location
    fn apply_apex_location(&self, message: &str, record: &mut FaultRecord) {
        let Some(caps) = self.apex_location.captures(message) else {
            return;
        };

        record.class_name = caps.get(1).map(|m| m.as_str().to_string());
        record.method_name = caps.get(2).map(|m| m.as_str().to_string());
        if record.line_number.is_none() {
            record.line_number = caps.get(3).and_then(|m| m.as_str().parse().ok());
        }
        if record.column_number.is_none() {
            record.column_number = caps.get(4).and_then(|m| m.as_str().parse().ok());
        }
        seed_language(record, Language::Apex);
    }

    /// Rule 3: JavaScript stack frames, all of them; the first also seeds the
    /// location fields when rule 2 left them unset
    fn apply_stack_frames(&self, message: &str, record: &mut FaultRecord) {
        for caps in self.stack_frame.captures_iter(message) {
            let (Some(function), Some(file), Some(line), Some(column)) =
                (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
            else {
                continue;
            };
            let (Ok(line), Ok(column)) = (line.as_str().parse(), column.as_str().parse()) else {
                continue;
            };

            if record.stack_frames.is_empty() {
                if record.file_name.is_none() {
                    record.file_name = Some(file.as_str().to_string());
                }
                if record.line_number.is_none() {
                    record.line_number = Some(line);
                }
                if record.column_number.is_none() {
                    record.column_number = Some(column);
                }
                seed_language(record, Language::Javascript);
            }

            record.stack_frames.push(StackFrame {
                function: function.as_str().to_string(),
                file: file.as_str().to_string(),
                line,
                column,
            });
        }
    }

    /// Rule 4: first mention of a file with a known source extension seeds
    /// whatever location fields are still unset
    fn apply_file_reference(&self, message: &str, record: &mut FaultRecord) {
        let Some(caps) = self.file_reference.captures(message) else {
            return;
        };

        if record.file_name.is_none() {
            record.file_name = caps.get(1).map(|m| m.as_str().to_string());
        }
        if record.line_number.is_none() {
            record.line_number = caps.get(3).and_then(|m| m.as_str().parse().ok());
        }
        if let Some(ext) = caps.get(2) {
            seed_language(record, language_for_extension(ext.as_str()));
        }
    }

    /// Rule 5: ordered keyword fallback, only when the type is still unknown
    fn apply_keyword_fallback(&self, message: &str, record: &mut FaultRecord) {
        if record.fault_type != "Unknown" {
            return;
        }

        for (needle, fault_type) in TYPE_KEYWORDS {
            if message.contains(needle) {
                record.fault_type = (*fault_type).to_string();
                return;
            }
        }
    }
}

impl Default for FaultParser {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants; a failure here is a programming
    // error, not an input error.
    Regex::new(pattern).expect("hard-coded fault pattern must compile")
}

/// Language is inferred once and never overwritten
fn seed_language(record: &mut FaultRecord, language: Language) {
    if record.language == Language::Unknown {
        record.language = language;
    }
}

fn language_for_extension(extension: &str) -> Language {
    match extension {
        "cls" | "trigger" | "apex" => Language::Apex,
        "js" => Language::Javascript,
        "java" => Language::Java,
        "py" => Language::Python,
        _ => Language::Unknown,
    }
}
