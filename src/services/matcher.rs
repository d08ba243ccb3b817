//! Canonical/fuzzy matcher: maps a raw fragment to the closest entry of
//! a canonical list, or signals no match.

/// Cutoff for split-boundary decisions. Stricter than the post-hoc
/// cutoffs because a bad match here corrupts the split itself.
pub const SPLIT_CUTOFF: f64 = 0.88;

/// Cutoff for canonicalizing an already-segmented program fragment.
pub const PROGRAM_CUTOFF: f64 = 0.78;

/// Cutoff for canonicalizing an already-segmented university fragment.
pub const UNIVERSITY_CUTOFF: f64 = 0.80;

/// Find the best canonical match for `candidate`.
///
/// Exact match wins immediately. Otherwise the single highest
/// Jaro-Winkler similarity (case-folded) is returned, and only if it
/// reaches `cutoff`.
pub fn best_match<'a>(candidate: &str, canonical: &'a [String], cutoff: f64) -> Option<&'a str> {
    if candidate.is_empty() || canonical.is_empty() {
        return None;
    }

    if let Some(exact) = canonical.iter().find(|entry| entry.as_str() == candidate) {
        return Some(exact);
    }

    let folded = candidate.to_lowercase();
    let mut best: Option<(&str, f64)> = None;
    for entry in canonical {
        let score = strsim::jaro_winkler(&folded, &entry.to_lowercase());
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((entry, score));
        }
    }

    best.and_then(|(entry, score)| (score >= cutoff).then_some(entry))
}
