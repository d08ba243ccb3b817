//! Rule-based parser: composes splitter, normalizers, and matcher into a
//! single confident-or-escalate decision.
//!
//! The confidence gate is strict on purpose: escalating an ambiguous
//! record to the model fallback is always preferred over silently
//! emitting a wrong canonical answer.

use crate::registry::Registry;
use crate::services::{normalizer, splitter};
use crate::types::{Standardization, UNKNOWN};

/// Outcome of the rule path: either a confident result or an explicit
/// request to escalate to the model fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(Standardization),
    NeedsFallback,
}

/// Attempt to standardize `raw` using rules only.
pub fn parse(registry: &Registry, raw: &str) -> ParseOutcome {
    if raw.trim().is_empty() {
        // Blank input is fully determined; it never reaches the model.
        return ParseOutcome::Parsed(Standardization::unknown());
    }

    let split = splitter::split(registry, raw);
    let Some(university_raw) = split.university else {
        return ParseOutcome::NeedsFallback;
    };

    let program = normalizer::normalize_program(registry, &split.program);
    let university = normalizer::normalize_university(registry, &university_raw);

    if university != UNKNOWN && !program.is_empty() {
        return ParseOutcome::Parsed(Standardization::new(program, university));
    }

    // The program fragment normalized to empty. Still confident when the
    // raw university fragment is itself an exact canonical member; the
    // program falls back to the sentinel so no field is ever empty.
    if registry
        .universities()
        .iter()
        .any(|entry| entry == &university_raw)
    {
        let program = if program.is_empty() {
            UNKNOWN.to_string()
        } else {
            program
        };
        return ParseOutcome::Parsed(Standardization::new(program, university));
    }

    ParseOutcome::NeedsFallback
}
