//! Compiler pipeline for starkc.
//!
//! A host (CLI, editor plugin, service) captures a `SourceUnit` and hands it to
//! a `CompilationOrchestrator`, which owns the ordering and failure policy of
//! one compile run. Transport, hashing and storage stay behind their own
//! seams (`RemoteCompiler`, `ContentHasher`, `FileStore`) so the ordering can
//! be exercised with test doubles.

pub mod compile;

pub use compile::{CompilationOrchestrator, CompileOutcome};
