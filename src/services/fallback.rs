//! Model fallback service: lazily-initialized local model, fixed
//! few-shot prompt, response parsing, and memoized results.
//!
//! The handle moves Unloaded → Loading → Ready exactly once per process;
//! concurrent first callers all observe the same ready state. Inference
//! itself is a serialized critical section — the model host runs one
//! generation at a time — while cache reads stay concurrent.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde_json::{json, Value};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::registry::Registry;
use crate::services::normalizer;
use crate::services::ollama_client::{GenerateOptions, LlmClient};
use crate::services::splitter;
use crate::types::{Standardization, UNKNOWN};

/// Instruction prompt describing the splitting/expansion/casing rules.
const SYSTEM_PROMPT: &str = "You are a data cleaning assistant. Standardize degree program and university names.\n\n\
Rules:\n\
- Input provides a single string under key `program` that may contain both program and university.\n\
- Split into (program name, university name).\n\
- Trim extra spaces and commas.\n\
- Expand obvious abbreviations (e.g., \"McG\" -> \"McGill University\", \"UBC\" -> \"University of British Columbia\").\n\
- Use Title Case for program; use official capitalization for university names (e.g., \"University of X\").\n\
- Ensure correct spelling (e.g., \"McGill\", not \"McGiill\").\n\
- If university cannot be inferred, return \"Unknown\".\n\n\
Return JSON ONLY with keys:\n  standardized_program, standardized_university\n";

struct FewShot {
    input: &'static str,
    program: &'static str,
    university: &'static str,
}

/// Fixed worked examples included with every prompt.
const FEW_SHOTS: &[FewShot] = &[
    FewShot {
        input: "Information Studies, McGill University",
        program: "Information Studies",
        university: "McGill University",
    },
    FewShot {
        input: "Information, McG",
        program: "Information Studies",
        university: "McGill University",
    },
    FewShot {
        input: "Mathematics, University Of British Columbia",
        program: "Mathematics",
        university: "University of British Columbia",
    },
];

/// Model name plus the decoding/resource options for every call.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model: String,
    pub options: GenerateOptions,
}

impl ModelConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model_name.clone(),
            options: GenerateOptions {
                temperature: 0.0,
                top_p: 1.0,
                num_predict: 128,
                num_ctx: config.n_ctx,
                num_thread: config.n_threads,
                num_gpu: config.n_gpu_layers,
            },
        }
    }
}

/// The model-backed standardization path.
pub struct FallbackStandardizer {
    client: Arc<dyn LlmClient>,
    model: ModelConfig,
    registry: Arc<Registry>,
    /// Unloaded → Loading → Ready; single initialization under
    /// concurrency, every caller observes the same final state.
    ready: OnceCell<()>,
    /// Model execution is not safe for concurrent invocation.
    inference: Mutex<()>,
    /// Memoization of this path only, keyed by exact raw text. Entries
    /// never expire within a process lifetime.
    cache: RwLock<HashMap<String, Standardization>>,
    json_object: Regex,
}

impl FallbackStandardizer {
    pub fn new(client: Arc<dyn LlmClient>, model: ModelConfig, registry: Arc<Registry>) -> Self {
        Self {
            client,
            model,
            registry,
            ready: OnceCell::new(),
            inference: Mutex::new(()),
            cache: RwLock::new(HashMap::new()),
            json_object: Regex::new(r"(?s)\{.*?\}").expect("json object pattern is valid"),
        }
    }

    /// Make the model handle ready, pulling weights into local storage
    /// if they are not already present. Idempotent; the one-time model
    /// I/O happens here and nowhere else.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                if !self.client.is_model_available(&self.model.model).await? {
                    self.client.pull_model(&self.model.model).await?;
                }
                info!(model = %self.model.model, "Model ready");
                Ok::<(), crate::error::Error>(())
            })
            .await?;
        Ok(())
    }

    /// Standardize one raw record via the model, memoized by raw text.
    pub async fn standardize(&self, raw: &str) -> Result<Standardization> {
        if let Some(hit) = self.cache.read().await.get(raw) {
            debug!(raw = %raw, "Fallback cache hit");
            return Ok(hit.clone());
        }

        self.ensure_ready().await?;

        let prompt = build_prompt(raw);
        let output = {
            let _serial = self.inference.lock().await;
            self.client
                .generate(&self.model.model, SYSTEM_PROMPT, &prompt, &self.model.options)
                .await?
        };

        let (program_raw, university_raw) = match self.extract_fields(&output) {
            Some(fields) => fields,
            None => {
                warn!(raw = %raw, "Unparsable model output, degrading to rule-based split");
                let split = splitter::split(&self.registry, raw);
                (split.program, split.university.unwrap_or_default())
            }
        };

        let program = normalizer::normalize_program(&self.registry, &program_raw);
        let university = normalizer::normalize_university(&self.registry, &university_raw);
        let program = if program.is_empty() {
            UNKNOWN.to_string()
        } else {
            program
        };

        let result = Standardization::new(program, university);
        self.cache
            .write()
            .await
            .insert(raw.to_string(), result.clone());
        Ok(result)
    }

    /// Locate the first embedded JSON object with the two expected
    /// fields; `None` on any failure.
    fn extract_fields(&self, output: &str) -> Option<(String, String)> {
        let trimmed = output.trim();
        let snippet = self
            .json_object
            .find(trimmed)
            .map(|m| m.as_str())
            .unwrap_or(trimmed);
        let value: Value = serde_json::from_str(snippet).ok()?;
        let program = value.get("standardized_program")?.as_str()?.trim().to_string();
        let university = value
            .get("standardized_university")?
            .as_str()?
            .trim()
            .to_string();
        Some((program, university))
    }
}

/// Few-shot examples plus the current input, one JSON object per line.
fn build_prompt(raw: &str) -> String {
    let mut prompt = String::new();
    for shot in FEW_SHOTS {
        prompt.push_str(&json!({ "program": shot.input }).to_string());
        prompt.push('\n');
        prompt.push_str(
            &json!({
                "standardized_program": shot.program,
                "standardized_university": shot.university,
            })
            .to_string(),
        );
        prompt.push('\n');
    }
    prompt.push_str(&json!({ "program": raw }).to_string());
    prompt
}
