//! Compile orchestration.
//!
//! One run, in order:
//! 1. source -> intermediate (remote)
//! 2. intermediate -> final (remote)
//! 3. parse the intermediate as a Sierra class
//! 4. compute the class hash (pending signal raised)
//! 5. build the artifact
//! 6. register it, which also selects it
//! 7. write both outputs and switch the host to the intermediate file
//!
//! Failures in 1-4 leave the catalog and the file store untouched. Once step 6
//! has run the artifact stays registered; step 7 failures are logged and
//! reported on the outcome instead of undoing it.

use std::sync::Arc;

use bytes::Bytes;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::catalog::ArtifactCatalog;
use crate::compiler::RemoteCompiler;
use crate::config::OutputConfig;
use crate::determinism::hashing::ContentHasher;
use crate::errors::{CompileStage, StarkcError, StarkcResult};
use crate::model::{Artifact, SourceUnit};
use crate::store::{derive_output_paths, FileStore, OutputPaths};

/// Result of a run that reached registration.
#[derive(Debug)]
pub struct CompileOutcome {
    pub artifact: Arc<Artifact>,
    pub paths: OutputPaths,
    /// Set when step 7 failed; the artifact is registered regardless.
    pub persistence_error: Option<StarkcError>,
}

impl CompileOutcome {
    pub fn is_persisted(&self) -> bool {
        self.persistence_error.is_none()
    }

    /// Treat a persistence failure as an error.
    pub fn into_result(self) -> StarkcResult<Arc<Artifact>> {
        match self.persistence_error {
            Some(e) => Err(e),
            None => Ok(self.artifact),
        }
    }
}

/// Drives remote compilation, hashing and registration for one source at a time.
///
/// Runs may overlap: each gets its own `run_id`, the catalog serializes
/// appends, and no lock is held while waiting on the network or the store.
pub struct CompilationOrchestrator {
    compiler: Arc<dyn RemoteCompiler>,
    store: Arc<dyn FileStore>,
    catalog: Arc<ArtifactCatalog>,
    hasher: ContentHasher,
    output: OutputConfig,
}

impl CompilationOrchestrator {
    pub fn new(
        compiler: Arc<dyn RemoteCompiler>,
        store: Arc<dyn FileStore>,
        catalog: Arc<ArtifactCatalog>,
        output: OutputConfig,
    ) -> Self {
        let hasher = ContentHasher::new(catalog.hash_pending());
        Self {
            compiler,
            store,
            catalog,
            hasher,
            output,
        }
    }

    pub fn catalog(&self) -> &Arc<ArtifactCatalog> {
        &self.catalog
    }

    pub async fn compile(&self, unit: &SourceUnit) -> StarkcResult<CompileOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("compile", %run_id, source = unit.path());

        async move {
            let res = self.run(run_id, unit).await;
            if let Err(e) = &res {
                warn!(error = %e, "compile aborted; catalog unchanged");
            }
            res
        }
        .instrument(span)
        .await
    }

    async fn run(&self, run_id: Uuid, unit: &SourceUnit) -> StarkcResult<CompileOutcome> {
        info!(stage = %CompileStage::ToIntermediate, bytes = unit.content().len(), "compiling");
        let intermediate = self.compiler.to_intermediate(unit.content().clone()).await?;

        info!(stage = %CompileStage::ToFinal, bytes = intermediate.len(), "compiling");
        let final_repr = self
            .compiler
            .to_final(Bytes::from(intermediate.clone()))
            .await?;

        let parsed = self.hasher.parse(&intermediate)?;
        let class_hash = self.hasher.compute_id(&parsed)?;

        let artifact = Artifact {
            name: unit.name().to_string(),
            source_path: unit.path().to_string(),
            abi: parsed.abi().clone(),
            class_hash,
            intermediate: parsed.document,
            run_id,
            compiled_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        };
        let artifact = self.catalog.register(artifact);

        let paths = derive_output_paths(unit.path(), &self.output);
        let persistence_error = self.emit(&paths, &intermediate, &final_repr).err();
        if let Some(e) = &persistence_error {
            warn!(error = %e, "outputs not persisted; artifact stays registered");
        }

        Ok(CompileOutcome {
            artifact,
            paths,
            persistence_error,
        })
    }

    fn emit(&self, paths: &OutputPaths, intermediate: &str, final_repr: &str) -> StarkcResult<()> {
        self.store
            .write_file(&paths.intermediate_path, intermediate.as_bytes())
            .map_err(|e| StarkcError::persistence(format!("{e:#}")))?;
        self.store
            .write_file(&paths.final_path, final_repr.as_bytes())
            .map_err(|e| StarkcError::persistence(format!("{e:#}")))?;
        self.store
            .switch_active_file(&paths.intermediate_path)
            .map_err(|e| StarkcError::persistence(format!("{e:#}")))?;
        info!(
            intermediate_path = %paths.intermediate_path,
            final_path = %paths.final_path,
            "outputs written"
        );
        Ok(())
    }
}
