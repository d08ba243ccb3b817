//! Batch orchestrator: routes each record through the rule path or the
//! model fallback path, preserving original input order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::services::fallback::FallbackStandardizer;
use crate::services::rule_parser::{self, ParseOutcome};
use crate::types::{self, Row};

/// Order-preserving standardization over a sequence of records.
pub struct BatchStandardizer {
    registry: Arc<Registry>,
    fallback: Arc<FallbackStandardizer>,
    /// Bounded concurrency for fallback-needed records. Inference is
    /// still serialized inside the fallback service; this bounds the
    /// number of records in flight (cache hits overlap freely).
    max_workers: usize,
}

impl BatchStandardizer {
    pub fn new(
        registry: Arc<Registry>,
        fallback: Arc<FallbackStandardizer>,
        max_workers: usize,
    ) -> Self {
        Self {
            registry,
            fallback,
            max_workers: max_workers.max(1),
        }
    }

    /// Standardize `rows`, attaching the two derived fields to each and
    /// returning them in the original order. Per-record ambiguity is
    /// handled by escalation; only resource failures (the model cannot
    /// be obtained at all) abort the batch.
    pub async fn standardize_rows(&self, rows: Vec<Row>) -> Result<Vec<Row>> {
        let total = rows.len();

        // Tag every row with its original position, then partition.
        let mut done: Vec<(usize, Row)> = Vec::with_capacity(total);
        let mut pending: Vec<(usize, Row)> = Vec::new();

        for (index, mut row) in rows.into_iter().enumerate() {
            let raw = types::raw_program_text(&row).to_string();
            match rule_parser::parse(&self.registry, &raw) {
                ParseOutcome::Parsed(result) => {
                    result.attach_to(&mut row);
                    done.push((index, row));
                }
                ParseOutcome::NeedsFallback => pending.push((index, row)),
            }
        }

        info!(
            total,
            rule_parsed = done.len(),
            fallback_needed = pending.len(),
            "Batch partitioned"
        );

        if !pending.is_empty() {
            // One model load before any fallback record is processed.
            self.fallback.ensure_ready().await?;

            let fallback = &self.fallback;
            let processed: Vec<(usize, Row)> = stream::iter(pending)
                .map(|(index, mut row)| async move {
                    let raw = types::raw_program_text(&row).to_string();
                    let result = fallback.standardize(&raw).await?;
                    result.attach_to(&mut row);
                    Ok::<(usize, Row), Error>((index, row))
                })
                .buffer_unordered(self.max_workers)
                .try_collect()
                .await?;

            done.extend(processed);
        }

        // Merge back into the original order.
        done.sort_by_key(|(index, _)| *index);
        Ok(done.into_iter().map(|(_, row)| row).collect())
    }
}

/// Process a JSON batch file: read rows, standardize, write the
/// augmented array to `out_path` (or stdout). Nothing is written until
/// the whole batch has been processed.
pub async fn process_file(
    batch: &BatchStandardizer,
    in_path: &Path,
    out_path: Option<&Path>,
    append: bool,
    to_stdout: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(in_path)?;
    let rows = types::rows_from_value(serde_json::from_str(&content)?);

    info!(path = %in_path.display(), rows = rows.len(), "Processing batch file");
    let out_rows = batch.standardize_rows(rows).await?;
    let serialized = serde_json::to_string_pretty(&out_rows)?;

    if to_stdout {
        println!("{serialized}");
    } else {
        let target = out_path
            .map(PathBuf::from)
            .unwrap_or_else(|| default_out_path(in_path));
        let mut options = std::fs::OpenOptions::new();
        if append {
            options.append(true).create(true);
        } else {
            options.write(true).create(true).truncate(true);
        }
        use std::io::Write;
        let mut sink = options.open(&target)?;
        writeln!(sink, "{serialized}")?;
        info!(path = %target.display(), "Batch output written");
    }

    info!(rows = out_rows.len(), "Batch complete");
    Ok(())
}

/// `input.json` → `input_llm.json`; other extensions get the suffix
/// appended to the file name.
fn default_out_path(in_path: &Path) -> PathBuf {
    match in_path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if in_path.extension().is_some_and(|ext| ext == "json") => {
            in_path.with_file_name(format!("{stem}_llm.json"))
        }
        _ => {
            let name = in_path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("batch");
            in_path.with_file_name(format!("{name}_llm.json"))
        }
    }
}
