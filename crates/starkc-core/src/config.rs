//! Configuration structures for starkc-core.
//!
//! Configuration objects are explicit and passed in by the host (CLI, editor
//! plugin, tests). The core crate itself does not read environment variables.

use std::time::Duration;

use crate::errors::{StarkcError, StarkcResult};

/// Global configuration container.
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    pub compiler: CompilerConfig,
    pub output: OutputConfig,
}

/// Remote compiler endpoint settings.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Base URL; stage endpoints are appended to it.
    pub base_url: String,
    /// Per-request timeout. Each stage gets the full budget.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 60_000,
            user_agent: format!("starkc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CompilerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `{base}/{endpoint}` with exactly one slash between the two.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

/// Where compiled outputs land relative to their source.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Folder created next to the source file.
    pub artifacts_dir: String,
    pub intermediate_ext: String,
    pub final_ext: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: "artifacts".to_string(),
            intermediate_ext: "json".to_string(),
            final_ext: "casm".to_string(),
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> StarkcResult<()> {
    let base = cfg.compiler.base_url.trim();
    if base.is_empty() {
        return Err(StarkcError::invalid_argument(
            "compiler base_url must not be empty",
        ));
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(StarkcError::invalid_argument(format!(
            "compiler base_url must be http(s): {base}"
        )));
    }

    if cfg.compiler.timeout_ms == 0 {
        return Err(StarkcError::invalid_argument(
            "timeout_ms must be greater than zero",
        ));
    }

    let out = &cfg.output;
    if out.artifacts_dir.is_empty() || out.artifacts_dir.contains(['/', '\\']) {
        return Err(StarkcError::invalid_argument(
            "artifacts_dir must be a single non-empty path segment",
        ));
    }
    if out.intermediate_ext.is_empty() || out.final_ext.is_empty() {
        return Err(StarkcError::invalid_argument(
            "output extensions must not be empty",
        ));
    }
    if out.intermediate_ext == out.final_ext {
        return Err(StarkcError::invalid_argument(
            "intermediate and final outputs need distinct extensions",
        ));
    }

    Ok(())
}
