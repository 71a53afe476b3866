use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use starkc_core::catalog::ArtifactCatalog;
use starkc_core::compiler::HttpRemoteCompiler;
use starkc_core::config::{validate_config, CoreConfig};
use starkc_core::pipeline::CompilationOrchestrator;
use starkc_core::store::{derive_output_paths, FsFileStore};
use tracing::{info, warn};

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ArtifactOut {
    pub name: String,
    pub source_path: String,
    pub class_hash: String,
    pub run_id: String,
    pub compiled_at: String,
    pub intermediate_path: String,
    pub final_path: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct FailureOut {
    pub file: String,
    pub stage: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CompileOut {
    pub endpoint: String,
    pub artifacts: Vec<ArtifactOut>,
    pub selected: Option<String>,
    /// False while a class hash is still being computed.
    pub hash_ready: bool,
    pub warnings: Vec<String>,
    pub failures: Vec<FailureOut>,
}

pub async fn run(cfg: &CoreConfig, root: &str, files: &[String], keep_going: bool) -> Result<()> {
    validate_config(cfg)?;
    input::require_dir(root)?;

    let store = Arc::new(FsFileStore::new(root));
    let catalog = Arc::new(ArtifactCatalog::new());
    let compiler = Arc::new(HttpRemoteCompiler::new(cfg.compiler.clone())?);
    let orchestrator = CompilationOrchestrator::new(
        compiler,
        store.clone(),
        catalog.clone(),
        cfg.output.clone(),
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(80));

    let mut pending = catalog.subscribe_hash_pending();
    let spinner = pb.clone();
    let watcher = tokio::spawn(async move {
        while pending.changed().await.is_ok() {
            if *pending.borrow_and_update() {
                spinner.set_message("computing class hash");
            }
        }
    });

    let mut warnings = Vec::new();
    let mut failures = Vec::new();
    for file in files {
        pb.set_message(format!("compiling {file}"));

        let result = match input::load_source(store.as_ref(), file) {
            Ok(unit) => orchestrator.compile(&unit).await.map_err(|e| {
                let stage = e.stage().map(|s| s.as_str().to_string());
                (stage, anyhow::Error::from(e))
            }),
            Err(e) => Err((None, e)),
        };

        match result {
            Ok(outcome) => {
                info!(file = %file, class_hash = %outcome.artifact.class_hash, "compiled");
                if let Some(e) = &outcome.persistence_error {
                    warn!(file = %file, error = %e, "outputs not written");
                    warnings.push(format!("{file}: {e}"));
                }
            }
            Err((stage, e)) => {
                if !keep_going {
                    watcher.abort();
                    pb.finish_and_clear();
                    return Err(e.context(format!("compile {file}")));
                }
                let error = format!("{e:#}");
                warn!(file = %file, error = %error, "skipping after failure");
                failures.push(FailureOut {
                    file: file.clone(),
                    stage,
                    error,
                });
            }
        }
    }

    watcher.abort();
    pb.finish_and_clear();

    let snap = catalog.snapshot();
    let selected_run = snap.selected.as_ref().map(|a| a.run_id);
    let artifacts: Vec<ArtifactOut> = snap
        .artifacts
        .iter()
        .map(|a| {
            let paths = derive_output_paths(&a.source_path, &cfg.output);
            ArtifactOut {
                name: a.name.clone(),
                source_path: a.source_path.clone(),
                class_hash: a.class_hash.to_hex(),
                run_id: a.run_id.to_string(),
                compiled_at: a.compiled_at.clone(),
                intermediate_path: paths.intermediate_path,
                final_path: paths.final_path,
                selected: Some(a.run_id) == selected_run,
            }
        })
        .collect();

    let failed = failures.len();
    if output::is_json() {
        output::print(&CompileOut {
            endpoint: cfg.compiler.base_url.clone(),
            selected: snap.selected.as_ref().map(|a| a.name.clone()),
            hash_ready: !catalog.is_hash_pending(),
            artifacts,
            warnings,
            failures,
        })?;
    } else {
        for a in &artifacts {
            let marker = if a.selected { " (selected)" } else { "" };
            output::status(true, &a.name, &format!("{}{marker}", a.class_hash))?;
        }
        for w in &warnings {
            output::status(false, "persist", w)?;
        }
        for f in &failures {
            output::status(false, &f.file, &f.error)?;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed to compile", files.len());
    }
    Ok(())
}
