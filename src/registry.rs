//! Canonical registries: known university and program names, plus the
//! static abbreviation and spelling-fix tables the normalizers consult.
//!
//! Lists are loaded once at startup and read-only afterwards. A missing
//! list file yields an empty (degraded) registry, not an error.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

/// One abbreviation rule: a whole-string, case-insensitive pattern and
/// the canonical university name it expands to. Rules are evaluated in
/// priority order; the first match wins.
struct AbbreviationRule {
    pattern: Regex,
    expansion: &'static str,
}

/// Abbreviation patterns, highest priority first.
const ABBREVIATION_TABLE: &[(&str, &str)] = &[
    (r"(?i)^mcg(\.|ill)?$", "McGill University"),
    (r"(?i)^(ubc|u\.?b\.?c\.?)$", "University of British Columbia"),
    (r"(?i)^uoft$", "University of Toronto"),
];

/// Known-misspelled or mis-capitalized university strings, fixed verbatim.
const UNIVERSITY_FIXES: &[(&str, &str)] = &[
    ("McGiill University", "McGill University"),
    ("Mcgill University", "McGill University"),
    ("University Of British Columbia", "University of British Columbia"),
];

/// Exact-string program fixes.
const PROGRAM_FIXES: &[(&str, &str)] = &[
    ("Mathematic", "Mathematics"),
    ("Info Studies", "Information Studies"),
];

/// University-indicating keywords plus well-known standalone institution
/// names. Matching anywhere in a candidate fragment is a strong signal
/// that the fragment is a university name.
const UNIVERSITY_SIGNAL_PATTERN: &str = r"(?i)\b(university|college|institute|school|polytechnic|academy|conservatory|seminary)|\b(MIT|UCLA|USC|NYU|CUNY|SUNY|UCSF|UCSD|UCI|UCR|UCD|UCSB|UCSC|UCB|UBC|EPFL|ETH|Caltech|Emory|Purdue|Rutgers|Drexel|Brandeis|Tufts|Vanderbilt|Georgetown|Stanford|Harvard|Yale|Princeton|Columbia|Cornell|Dartmouth|Brown|Rice|Duke|Oxford|Cambridge)\b";

/// Canonical name registries plus the compiled pattern tables used by
/// the splitter and normalizers. Constructed once at process start and
/// shared read-only across the pipeline.
pub struct Registry {
    universities: Vec<String>,
    programs: Vec<String>,
    abbreviations: Vec<AbbreviationRule>,
    university_fixes: HashMap<&'static str, &'static str>,
    program_fixes: HashMap<&'static str, &'static str>,
    university_signal: Regex,
    trailing_abbrev: Regex,
    dept_prefix: Regex,
    whitespace: Regex,
}

impl Registry {
    /// Load canonical lists from the configured text files.
    pub fn load(universities_path: &Path, programs_path: &Path) -> Self {
        let universities = read_lines(universities_path);
        let programs = read_lines(programs_path);
        info!(
            universities = universities.len(),
            programs = programs.len(),
            "Canonical registries loaded"
        );
        Self::with_lists(universities, programs)
    }

    /// Build a registry from in-memory lists.
    pub fn with_lists(universities: Vec<String>, programs: Vec<String>) -> Self {
        let abbreviations = ABBREVIATION_TABLE
            .iter()
            .map(|(pattern, expansion)| AbbreviationRule {
                pattern: Regex::new(pattern).expect("abbreviation pattern is valid"),
                expansion,
            })
            .collect();

        Self {
            universities,
            programs,
            abbreviations,
            university_fixes: UNIVERSITY_FIXES.iter().copied().collect(),
            program_fixes: PROGRAM_FIXES.iter().copied().collect(),
            university_signal: Regex::new(UNIVERSITY_SIGNAL_PATTERN)
                .expect("signal pattern is valid"),
            trailing_abbrev: Regex::new(r"\s*\([A-Z]{2,}\)\s*$")
                .expect("trailing abbrev pattern is valid"),
            dept_prefix: Regex::new(r"(?i)^(department|dept\.?)\s+of\s+")
                .expect("dept prefix pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
        }
    }

    /// Canonical university names, in file order.
    pub fn universities(&self) -> &[String] {
        &self.universities
    }

    /// Canonical program names, in file order.
    pub fn programs(&self) -> &[String] {
        &self.programs
    }

    /// Whole-string abbreviation expansion ("McG" → "McGill University").
    pub fn expand_abbreviation(&self, raw: &str) -> Option<&'static str> {
        self.abbreviations
            .iter()
            .find(|rule| rule.pattern.is_match(raw))
            .map(|rule| rule.expansion)
    }

    /// Exact-string spelling fix for a university name.
    pub fn fix_university(&self, raw: &str) -> Option<&'static str> {
        self.university_fixes.get(raw).copied()
    }

    /// Exact-string spelling fix for a program name.
    pub fn fix_program(&self, raw: &str) -> Option<&'static str> {
        self.program_fixes.get(raw).copied()
    }

    /// Does the fragment carry a university keyword or a well-known
    /// standalone institution name?
    pub fn has_university_signal(&self, fragment: &str) -> bool {
        self.university_signal.is_match(fragment)
    }

    /// Strip a trailing all-caps parenthetical abbreviation like "(MIT)".
    pub fn strip_trailing_abbrev(&self, s: &str) -> String {
        self.trailing_abbrev.replace(s, "").trim().to_string()
    }

    /// Strip a leading "Department of" / "Dept. of" prefix.
    pub fn strip_dept_prefix(&self, s: &str) -> String {
        self.dept_prefix.replace(s, "").to_string()
    }

    /// Collapse internal whitespace runs to single spaces.
    pub fn collapse_whitespace(&self, s: &str) -> String {
        self.whitespace.replace_all(s, " ").to_string()
    }
}

/// Read non-empty, stripped lines from a UTF-8 file. A missing or
/// unreadable file is a valid degraded state: empty list.
fn read_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Canonical list unavailable, using empty registry");
            Vec::new()
        }
    }
}
