//! Error types for starkc-core.
//!
//! Every failure the compile pipeline can surface maps onto one variant here.
//! Remote and parse failures abort a run before any state changes; persistence
//! failures happen after registration and never undo it.

use std::fmt;

/// Result alias used across the crate.
pub type StarkcResult<T> = Result<T, StarkcError>;

/// Which remote compilation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileStage {
    /// Cairo source -> Sierra.
    ToIntermediate,
    /// Sierra -> CASM.
    ToFinal,
}

impl CompileStage {
    /// Stable stage name, also used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToIntermediate => "to-intermediate",
            Self::ToFinal => "to-final",
        }
    }

    /// Endpoint path segment served by the remote compiler.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::ToIntermediate => "compile-to-intermediate",
            Self::ToFinal => "compile-to-final",
        }
    }
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StarkcError {
    /// Network, HTTP status, timeout or body read failure at one stage.
    #[error("remote compilation failed at {stage}: {cause}")]
    RemoteCompilation { stage: CompileStage, cause: String },

    /// The remote compiler returned a document that is not a usable Sierra class.
    #[error("malformed intermediate representation: {cause}")]
    MalformedIntermediate { cause: String },

    /// Writing outputs or switching the active file failed.
    #[error("persistence failed: {cause}")]
    Persistence { cause: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl StarkcError {
    pub fn remote(stage: CompileStage, cause: impl fmt::Display) -> Self {
        Self::RemoteCompilation {
            stage,
            cause: cause.to_string(),
        }
    }

    pub fn malformed(cause: impl fmt::Display) -> Self {
        Self::MalformedIntermediate {
            cause: cause.to_string(),
        }
    }

    pub fn persistence(cause: impl fmt::Display) -> Self {
        Self::Persistence {
            cause: cause.to_string(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Stage that failed, for remote compilation errors only.
    pub fn stage(&self) -> Option<CompileStage> {
        match self {
            Self::RemoteCompilation { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
