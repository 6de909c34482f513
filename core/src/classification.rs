//! Fault Classification Module
//!
//! Table-driven severity/category tagging consumed by the ticketing layer.
//! The mapping is total: every fault-type string lands on exactly one
//! severity/category pair, with an explicit default for anything unlisted.

use serde::{Deserialize, Serialize};

/// Severity tier attached to an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Error,
}

/// Broad category of the fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    GovernorLimit,
    Runtime,
}

/// Severity/category pair for one fault type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    pub category: Category,
}

/// Fault types carrying High severity. Everything else not in a dedicated
/// row below falls through to the default.
const HIGH_SEVERITY_TYPES: &[&str] = &[
    "NullPointerException",
    "DmlException",
    "StringException",
    "QueryException",
];

/// Classify one fault type
pub fn classify(fault_type: &str) -> Classification {
    if fault_type == "LimitException" {
        return Classification {
            severity: Severity::Critical,
            category: Category::GovernorLimit,
        };
    }

    if HIGH_SEVERITY_TYPES.contains(&fault_type) {
        return Classification {
            severity: Severity::High,
            category: Category::Runtime,
        };
    }

    Classification {
        severity: Severity::Error,
        category: Category::Runtime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exception_is_critical_governor_limit() {
        let classification = classify("LimitException");
        assert_eq!(classification.severity, Severity::Critical);
        assert_eq!(classification.category, Category::GovernorLimit);
    }

    #[test]
    fn test_high_severity_types() {
        for fault_type in [
            "NullPointerException",
            "DmlException",
            "StringException",
            "QueryException",
        ] {
            assert_eq!(classify(fault_type).severity, Severity::High, "{}", fault_type);
        }
    }

    #[test]
    fn test_default_is_error_runtime() {
        for fault_type in ["TypeError", "Unknown", "NeverHeardOfIt"] {
            let classification = classify(fault_type);
            assert_eq!(classification.severity, Severity::Error, "{}", fault_type);
            assert_eq!(classification.category, Category::Runtime, "{}", fault_type);
        }
    }
}
