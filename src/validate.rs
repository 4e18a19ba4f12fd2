//! Input validation for session configuration.
//!
//! Provides O(1) validation sets and synonym maps so users can name a
//! sync mode the way they think of it. Three-tier resolution:
//! exact match → synonym lookup → error with suggestion.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_MODES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["csv", "copy", "move"].into_iter().collect());

// ── Synonym maps ─────────────────────────────────────────────

pub static MODE_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("record", "csv"),
        ("record-only", "csv"),
        ("record_only", "csv"),
        ("table", "csv"),
        ("none", "csv"),
        ("duplicate", "copy"),
        ("cp", "copy"),
        ("relocate", "move"),
        ("mv", "move"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a mode string via exact match or synonym lookup.
///
/// Returns the canonical mode, or an error with the original input
/// and an optional suggestion.
pub fn normalize_mode(input: &str) -> Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if VALID_MODES.contains(lower.as_str()) {
        return Ok(lower);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = MODE_SYNONYMS.get(lower.as_str()) {
        return Ok(canonical.to_string());
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&lower, &VALID_MODES, &MODE_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Check that a label name can serve as a catalog entry and a folder name.
///
/// Returns a message describing the first problem found.
pub fn validate_label(label: &str) -> Result<(), String> {
    if label.trim().is_empty() {
        return Err("label names cannot be blank".to_string());
    }
    if label != label.trim() {
        return Err(format!("label '{label}' has leading or trailing whitespace"));
    }
    if label == "." || label == ".." {
        return Err(format!("label '{label}' is not a usable folder name"));
    }
    if label.contains(['/', '\\']) || label.chars().any(char::is_control) {
        return Err(format!(
            "label '{label}' contains a path separator or control character"
        ));
    }
    Ok(())
}

/// Validate an ordered list of labels: each must be valid and unique.
pub fn validate_labels(labels: &[String]) -> Result<(), String> {
    if labels.is_empty() {
        return Err("at least one label is required".to_string());
    }

    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        validate_label(label)?;
        if !seen.insert(label.as_str()) {
            return Err(format!("duplicate label '{label}'"));
        }
    }
    Ok(())
}

/// Split a comma-separated label list, trimming each entry.
#[must_use]
pub fn split_labels(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 2 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            let shown = synonyms.get(v).copied().unwrap_or(v);
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find catalog labels similar to the searched one.
///
/// Returns up to `max` suggestions with edit distance ≤ 2,
/// sorted by distance then alphabetically.
pub fn find_similar<'a>(
    searched: &str,
    existing: impl IntoIterator<Item = &'a str>,
    max: usize,
) -> Vec<String> {
    let searched = searched.to_lowercase();
    let mut candidates: Vec<(usize, &str)> = existing
        .into_iter()
        .map(|s| (levenshtein_distance(&searched, &s.to_lowercase()), s))
        .filter(|(dist, _)| *dist <= 2)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, s)| s.to_string())
        .collect()
}
