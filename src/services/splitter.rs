//! Right-scan splitter: segments a combined "program, university" string.
//!
//! Candidate boundaries are tested from the rightmost comma toward the
//! left, because the university is expected at the end while program
//! names legitimately contain commas ("Criminology, Law and Society").

use crate::registry::Registry;
use crate::services::matcher::{self, SPLIT_CUTOFF};

/// Outcome of splitting a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    /// The program fragment (may still contain commas).
    pub program: String,
    /// The university fragment; `None` means no reliable separator was
    /// found and the caller must escalate to the fallback path.
    pub university: Option<String>,
}

/// Split `raw` into program and university fragments.
pub fn split(registry: &Registry, raw: &str) -> SplitResult {
    let collapsed = registry.collapse_whitespace(raw);
    let trimmed = collapsed.trim().trim_matches(',').trim();

    let parts: Vec<&str> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() <= 1 {
        // No comma separator; the whole string is the program candidate.
        return SplitResult {
            program: trimmed.to_string(),
            university: None,
        };
    }

    // Scan from the right: candidate university built from the last 1,
    // 2, ... parts. Canonical membership (exact or high-cutoff fuzzy)
    // is checked before the weaker keyword signal.
    for boundary in (1..parts.len()).rev() {
        let candidate = parts[boundary..].join(", ");

        if let Some(canonical) =
            matcher::best_match(&candidate, registry.universities(), SPLIT_CUTOFF)
        {
            return SplitResult {
                program: parts[..boundary].join(", "),
                university: Some(canonical.to_string()),
            };
        }

        if registry.has_university_signal(&candidate) {
            return SplitResult {
                program: parts[..boundary].join(", "),
                university: Some(candidate),
            };
        }
    }

    // No boundary passed any test: first part = program, rest = university.
    SplitResult {
        program: parts[0].to_string(),
        university: Some(parts[1..].join(", ")),
    }
}
