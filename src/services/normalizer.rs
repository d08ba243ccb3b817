//! Field normalizers for program and university fragments.
//!
//! Both normalizers are idempotent: re-applying one to its own output
//! is a no-op.

use crate::registry::Registry;
use crate::services::matcher::{self, PROGRAM_CUTOFF, UNIVERSITY_CUTOFF};
use crate::types::UNKNOWN;

/// Minor words kept lowercase inside program names (except leading).
const PROGRAM_MINOR_WORDS: &[&str] = &["and", "of", "in", "for", "the", "with", "to"];

/// Minor words plus locale particles kept lowercase inside university names.
const UNIVERSITY_MINOR_WORDS: &[&str] = &["of", "and", "in", "for", "the", "at", "de", "du", "des"];

/// Normalize a program fragment: exact fixes, parenthetical/department
/// stripping, title casing, then canonical/fuzzy mapping.
pub fn normalize_program(registry: &Registry, raw: &str) -> String {
    let mut program = raw.trim().to_string();

    if let Some(fixed) = registry.fix_program(&program) {
        program = fixed.to_string();
    }

    program = registry.strip_trailing_abbrev(&program);
    program = registry.strip_dept_prefix(&program);
    program = program.trim().trim_matches(',').trim().to_string();
    program = title_case(&program, PROGRAM_MINOR_WORDS);

    match matcher::best_match(&program, registry.programs(), PROGRAM_CUTOFF) {
        Some(canonical) => canonical.to_string(),
        None => program,
    }
}

/// Normalize a university fragment: abbreviation expansion, exact fixes,
/// parenthetical stripping, title casing, then canonical/fuzzy mapping.
/// Empty input normalizes to the "Unknown" sentinel.
pub fn normalize_university(registry: &Registry, raw: &str) -> String {
    let mut university = raw.trim().to_string();

    if let Some(expanded) = registry.expand_abbreviation(&university) {
        university = expanded.to_string();
    }

    if let Some(fixed) = registry.fix_university(&university) {
        university = fixed.to_string();
    }

    university = registry.strip_trailing_abbrev(&university);

    if !university.is_empty() {
        university = title_case(&university, UNIVERSITY_MINOR_WORDS);
    }

    if let Some(canonical) =
        matcher::best_match(&university, registry.universities(), UNIVERSITY_CUTOFF)
    {
        return canonical.to_string();
    }

    if university.is_empty() {
        UNKNOWN.to_string()
    } else {
        university
    }
}

/// Title-case a phrase, lowercasing `minor_words` everywhere except the
/// first word.
fn title_case(phrase: &str, minor_words: &[&str]) -> String {
    phrase
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| {
            let lowered = word.to_lowercase();
            let bare: String = lowered
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect();
            if index > 0 && minor_words.contains(&bare.as_str()) {
                lowered
            } else {
                capitalize(&lowered)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first alphabetic character of an already-lowercased word.
fn capitalize(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut done = false;
    for c in word.chars() {
        if !done && c.is_alphabetic() {
            result.extend(c.to_uppercase());
            done = true;
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::with_lists(
            vec![
                "McGill University".to_string(),
                "University of British Columbia".to_string(),
                "Temple University".to_string(),
            ],
            vec![
                "Information Studies".to_string(),
                "Mathematics".to_string(),
                "Criminology, Law and Society".to_string(),
            ],
        )
    }

    #[test]
    fn program_title_case_keeps_minor_words_lower() {
        let reg = registry();
        assert_eq!(
            normalize_program(&reg, "history of science and technology"),
            "History of Science and Technology"
        );
    }

    #[test]
    fn program_leading_minor_word_is_capitalized() {
        let reg = registry();
        assert_eq!(normalize_program(&reg, "the classics"), "The Classics");
    }

    #[test]
    fn program_strips_department_prefix_and_parenthetical() {
        let reg = registry();
        assert_eq!(
            normalize_program(&reg, "Department of Organizational Leadership (OLPD)"),
            "Organizational Leadership"
        );
    }

    #[test]
    fn program_exact_fix_then_canonical() {
        let reg = registry();
        assert_eq!(normalize_program(&reg, "Mathematic"), "Mathematics");
        assert_eq!(normalize_program(&reg, "Info Studies"), "Information Studies");
    }

    #[test]
    fn program_fuzzy_canonicalization() {
        let reg = registry();
        assert_eq!(normalize_program(&reg, "mathematics"), "Mathematics");
        assert_eq!(normalize_program(&reg, "Informaton Studies"), "Information Studies");
    }

    #[test]
    fn program_without_canonical_entry_passes_through() {
        let reg = registry();
        assert_eq!(normalize_program(&reg, "underwater basket weaving"), "Underwater Basket Weaving");
    }

    #[test]
    fn university_abbreviation_expands_before_anything_else() {
        let reg = registry();
        assert_eq!(normalize_university(&reg, "McG"), "McGill University");
        assert_eq!(normalize_university(&reg, "ubc"), "University of British Columbia");
    }

    #[test]
    fn university_capitalization_fix() {
        let reg = registry();
        assert_eq!(
            normalize_university(&reg, "University Of British Columbia"),
            "University of British Columbia"
        );
        assert_eq!(normalize_university(&reg, "Mcgill University"), "McGill University");
    }

    #[test]
    fn university_misspelling_fixed_by_fuzzy_match() {
        let reg = registry();
        assert_eq!(normalize_university(&reg, "McGiill University"), "McGill University");
    }

    #[test]
    fn empty_university_is_unknown() {
        let reg = registry();
        assert_eq!(normalize_university(&reg, ""), UNKNOWN);
        assert_eq!(normalize_university(&reg, "   "), UNKNOWN);
    }

    #[test]
    fn normalize_program_is_idempotent() {
        let reg = registry();
        for raw in [
            "Department of Organizational Leadership (OLPD)",
            "criminology, law and society",
            "Info Studies",
            "underwater basket weaving",
            "",
        ] {
            let once = normalize_program(&reg, raw);
            let twice = normalize_program(&reg, &once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_university_is_idempotent() {
        let reg = registry();
        for raw in [
            "McG",
            "u.b.c.",
            "McGiill University",
            "temple university",
            "Unheard Of College",
            "",
        ] {
            let once = normalize_university(&reg, raw);
            let twice = normalize_university(&reg, &once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
