//! Repository File Resolver Module
//!
//! Ranks repository tree entries against a fault record and selects at most
//! two candidate source files. Matching is a strict tier ladder: an exact
//! file-name suffix match (tier 1) wins outright, an exact class-name match
//! (tier 2) is only tried when tier 1 found nothing, and a method-name
//! substring match (tier 3) only when both above came up empty. Bounding the
//! result to two files trades recall for precision on purpose.

use tracing::debug;

use crate::{FaultRecord, FileCandidate, RepoEntry};

/// Maximum number of candidates returned
const MAX_CANDIDATES: usize = 2;

/// Resolve the fault against a flat repository tree listing
///
/// Returns 0 to 2 candidates ordered by ascending tier. An empty result is
/// not an error; it signals "analyze without file context".
pub fn resolve(fault: &FaultRecord, tree: &[RepoEntry]) -> Vec<FileCandidate> {
    let mut candidates = Vec::new();

    if let Some(file_name) = &fault.file_name {
        candidates.extend(match_file_name(file_name, tree));
    }

    if candidates.is_empty() {
        if let Some(class_name) = &fault.class_name {
            candidates.extend(match_class_name(class_name, tree));
        }
    }

    if candidates.is_empty() {
        if let Some(method_name) = &fault.method_name {
            candidates.extend(match_method_name(method_name, tree));
        }
    }

    candidates.sort_by_key(|candidate| candidate.priority_tier);
    candidates.truncate(MAX_CANDIDATES);

    debug!(
        count = candidates.len(),
        "resolved file candidates for fault type {}", fault.fault_type
    );
    candidates
}

/// Tier 1: path ends with the reported file name (case sensitive)
fn match_file_name(file_name: &str, tree: &[RepoEntry]) -> Vec<FileCandidate> {
    tree.iter()
        .filter(|entry| entry.is_file() && entry.path.ends_with(file_name))
        .map(|entry| FileCandidate {
            path: entry.path.clone(),
            priority_tier: 1,
            reason: format!("file name matches '{}'", file_name),
        })
        .collect()
}

/// Tier 2: base name (final path segment, extension stripped) equals the
/// class name exactly
fn match_class_name(class_name: &str, tree: &[RepoEntry]) -> Vec<FileCandidate> {
    tree.iter()
        .filter(|entry| entry.is_file() && base_name(&entry.path) == class_name)
        .map(|entry| FileCandidate {
            path: entry.path.clone(),
            priority_tier: 2,
            reason: format!("class name matches '{}'", class_name),
        })
        .collect()
}

/// Tier 3: full path contains the method name anywhere
fn match_method_name(method_name: &str, tree: &[RepoEntry]) -> Vec<FileCandidate> {
    tree.iter()
        .filter(|entry| entry.is_file() && entry.path.contains(method_name))
        .map(|entry| FileCandidate {
            path: entry.path.clone(),
            priority_tier: 3,
            reason: format!("path mentions method '{}'", method_name),
        })
        .collect()
}

/// Final path segment with its extension removed
fn base_name(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RepoEntryKind;

    fn blob(path: &str) -> RepoEntry {
        RepoEntry {
            path: path.to_string(),
            kind: RepoEntryKind::Blob,
        }
    }

    fn tree_dir(path: &str) -> RepoEntry {
        RepoEntry {
            path: path.to_string(),
            kind: RepoEntryKind::Tree,
        }
    }

    fn fault_with(
        file_name: Option<&str>,
        class_name: Option<&str>,
        method_name: Option<&str>,
    ) -> FaultRecord {
        FaultRecord {
            file_name: file_name.map(str::to_string),
            class_name: class_name.map(str::to_string),
            method_name: method_name.map(str::to_string),
            ..FaultRecord::unknown("test")
        }
    }

    #[test]
    fn test_tier_one_suffix_match() {
        let tree = vec![
            blob("force-app/main/default/classes/AccountHandler.cls"),
            blob("docs/AccountHandler.md"),
            tree_dir("force-app/main"),
        ];
        let fault = fault_with(Some("AccountHandler.cls"), None, None);

        let candidates = resolve(&fault, &tree);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].priority_tier, 1);
        assert_eq!(
            candidates[0].path,
            "force-app/main/default/classes/AccountHandler.cls"
        );
    }

    #[test]
    fn test_tier_one_short_circuits_lower_tiers() {
        // Class and method would also match; they must never appear once a
        // tier-1 candidate exists.
        let tree = vec![
            blob("src/AccountHandler.cls"),
            blob("src/OtherAccountHandler.cls"),
            blob("src/processAccountJob.cls"),
        ];
        let fault = fault_with(
            Some("AccountHandler.cls"),
            Some("OtherAccountHandler"),
            Some("processAccount"),
        );

        let candidates = resolve(&fault, &tree);
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|c| c.priority_tier == 1));
    }

    #[test]
    fn test_tier_two_exact_base_name() {
        let tree = vec![
            blob("classes/AccountTriggerHandler.cls"),
            blob("classes/AccountTriggerHandlerTest.cls"),
        ];
        let fault = fault_with(None, Some("AccountTriggerHandler"), None);

        let candidates = resolve(&fault, &tree);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].priority_tier, 2);
        assert_eq!(candidates[0].path, "classes/AccountTriggerHandler.cls");
    }

    #[test]
    fn test_tier_three_substring_match() {
        let tree = vec![
            blob("src/handleTriggerUtils.cls"),
            blob("src/unrelated.cls"),
        ];
        let fault = fault_with(None, None, Some("handleTrigger"));

        let candidates = resolve(&fault, &tree);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].priority_tier, 3);
    }

    #[test]
    fn test_result_capped_at_two() {
        let tree = vec![
            blob("a/Handler.cls"),
            blob("b/Handler.cls"),
            blob("c/Handler.cls"),
        ];
        let fault = fault_with(Some("Handler.cls"), None, None);

        let candidates = resolve(&fault, &tree);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_directories_are_never_candidates() {
        let tree = vec![tree_dir("src/AccountHandler.cls")];
        let fault = fault_with(Some("AccountHandler.cls"), None, None);

        assert!(resolve(&fault, &tree).is_empty());
    }

    #[test]
    fn test_empty_fault_yields_empty_result() {
        let tree = vec![blob("src/Anything.cls")];
        let fault = fault_with(None, None, None);

        assert!(resolve(&fault, &tree).is_empty());
    }
}
