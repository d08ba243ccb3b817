//! Shared types for the standardization pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel used when a university (or program) cannot be determined.
pub const UNKNOWN: &str = "Unknown";

/// Input field holding the raw combined "program, university" text.
pub const PROGRAM_FIELD: &str = "program";

/// Derived field attached to each output row: the standardized program.
pub const OUT_PROGRAM_FIELD: &str = "llm-generated-program";

/// Derived field attached to each output row: the standardized university.
pub const OUT_UNIVERSITY_FIELD: &str = "llm-generated-university";

/// A single input/output record. Carries arbitrary fields which pass
/// through the pipeline untouched; only the two derived fields are added.
pub type Row = serde_json::Map<String, Value>;

/// A standardized `(program, university)` pair.
///
/// Both fields are non-empty; `university == "Unknown"` is a valid
/// sentinel meaning "could not be determined".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standardization {
    pub program: String,
    pub university: String,
}

impl Standardization {
    pub fn new(program: impl Into<String>, university: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            university: university.into(),
        }
    }

    /// Both fields set to the sentinel (blank input, total failure).
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    /// Attach the derived fields to a row, leaving all others untouched.
    pub fn attach_to(&self, row: &mut Row) {
        row.insert(
            OUT_PROGRAM_FIELD.to_string(),
            Value::String(self.program.clone()),
        );
        row.insert(
            OUT_UNIVERSITY_FIELD.to_string(),
            Value::String(self.university.clone()),
        );
    }
}

/// Extract the raw program text from a row (missing or non-string → empty).
pub fn raw_program_text(row: &Row) -> &str {
    row.get(PROGRAM_FIELD).and_then(Value::as_str).unwrap_or("")
}

/// Accept either a plain list of rows or `{"rows": [...]}`.
///
/// Anything else (including non-object list elements) degrades to empty
/// rather than erroring, per the service boundary contract.
pub fn rows_from_value(value: Value) -> Vec<Row> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("rows") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => map,
            _ => Row::new(),
        })
        .collect()
}
