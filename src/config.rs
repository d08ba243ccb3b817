//! Environment-driven configuration with defaults.
//!
//! Every recognized option has a working default so the service starts
//! with no configuration at all; invalid values fall back to the
//! default with a warning rather than aborting startup.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the local model host (where weights are pulled from
    /// and inference runs).
    pub model_source_url: String,
    /// Model artifact identifier pulled into local storage on first use.
    pub model_name: String,
    /// Inference thread count.
    pub n_threads: u32,
    /// Context window size.
    pub n_ctx: u32,
    /// Accelerator layer count; 0 = processor-only.
    pub n_gpu_layers: u32,
    /// Canonical university list file.
    pub canon_universities_path: PathBuf,
    /// Canonical program list file.
    pub canon_programs_path: PathBuf,
    /// Maximum records in flight during batch processing.
    pub max_workers: usize,
    /// HTTP listening port.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            model_source_url: env_or("MODEL_SOURCE_URL", "http://localhost:11434"),
            model_name: env_or("MODEL_NAME", "tinyllama:1.1b-chat-v1.0-q4_K_M"),
            n_threads: env_parse("N_THREADS", default_threads()),
            n_ctx: env_parse("N_CTX", 2048),
            n_gpu_layers: env_parse("N_GPU_LAYERS", 0),
            canon_universities_path: PathBuf::from(env_or(
                "CANON_UNIS_PATH",
                "canon_universities.txt",
            )),
            canon_programs_path: PathBuf::from(env_or("CANON_PROGS_PATH", "canon_programs.txt")),
            max_workers: env_parse("MAX_WORKERS", 4),
            port: env_parse("PORT", 8000),
        }
    }
}

fn default_threads() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(2)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, value, %default, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_without_environment() {
        std::env::remove_var("N_CTX");
        std::env::remove_var("PORT");
        let config = Config::from_env();
        assert_eq!(config.n_ctx, 2048);
        assert_eq!(config.port, 8000);
        assert_eq!(config.n_gpu_layers, 0);
        assert_eq!(config.model_source_url, "http://localhost:11434");
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        std::env::set_var("N_CTX", "4096");
        std::env::set_var("PORT", "9001");
        let config = Config::from_env();
        assert_eq!(config.n_ctx, 4096);
        assert_eq!(config.port, 9001);
        std::env::remove_var("N_CTX");
        std::env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn invalid_value_falls_back_to_default() {
        std::env::set_var("MAX_WORKERS", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.max_workers, 4);
        std::env::remove_var("MAX_WORKERS");
    }
}
