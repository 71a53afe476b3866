//! starkc-core
//!
//! Core primitives for starkc:
//! - Remote two-stage compilation client (Cairo -> Sierra -> CASM)
//! - Sierra parsing and class hash computation
//! - Append-only artifact catalog with a hash-pending signal
//! - Compile orchestration over a host-provided file store

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod determinism;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod version;

pub use crate::errors::{CompileStage, StarkcError, StarkcResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::catalog::{ArtifactCatalog, CatalogSnapshot, HashPendingSignal};
    #[cfg(feature = "http")]
    pub use crate::compiler::HttpRemoteCompiler;
    pub use crate::compiler::RemoteCompiler;
    pub use crate::config::{validate_config, CompilerConfig, CoreConfig, OutputConfig};
    pub use crate::determinism::{parse_intermediate, ContentHasher};
    pub use crate::model::{Artifact, ClassHash, ParsedIntermediate, SourceUnit};
    pub use crate::pipeline::{CompilationOrchestrator, CompileOutcome};
    pub use crate::store::{FileStore, FsFileStore, MemoryFileStore, OutputPaths};
    pub use crate::{CompileStage, StarkcError, StarkcResult};
}
