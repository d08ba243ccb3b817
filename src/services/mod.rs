//! Service modules for the standardization pipeline.
//!
//! The rule path (`splitter` → `normalizer` → `rule_parser`, with
//! `matcher` underneath) is pure and freely concurrent; `fallback`
//! owns the shared model handle and cache; `batch` fans records across
//! the two paths.

pub mod batch;
pub mod fallback;
pub mod matcher;
pub mod normalizer;
pub mod ollama_client;
pub mod rule_parser;
pub mod splitter;

pub use batch::BatchStandardizer;
pub use fallback::{FallbackStandardizer, ModelConfig};
pub use ollama_client::{LlmClient, LlmError, MockLlmClient, OllamaClient};
pub use rule_parser::ParseOutcome;
pub use splitter::SplitResult;
