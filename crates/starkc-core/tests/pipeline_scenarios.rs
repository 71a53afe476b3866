//! pipeline_scenarios.rs
//!
//! End-to-end behaviour of one compile run against scripted remote stages and
//! in-memory file stores: ordering, all-or-nothing registration, the
//! hash-pending signal, and post-registration persistence failures.

use std::sync::Arc;

use anyhow::bail;
use assert_matches::assert_matches;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use starkc_core::determinism::parse_intermediate;
use starkc_core::prelude::*;

const FIXTURE: &str = include_str!("fixtures/valid.sierra.json");
const CASM: &str = r#"{"prime": "0x800000000000011000000000000000000000000000000000000000000000001", "bytecode": []}"#;

/// Remote stages with canned answers. `Err` answers mimic the HTTP client's
/// failure shape.
struct Scripted {
    intermediate: Result<String, String>,
    final_repr: Result<String, String>,
    calls: Mutex<Vec<(CompileStage, Bytes)>>,
}

impl Scripted {
    fn new(intermediate: Result<&str, &str>, final_repr: Result<&str, &str>) -> Self {
        Self {
            intermediate: intermediate.map(str::to_string).map_err(str::to_string),
            final_repr: final_repr.map(str::to_string).map_err(str::to_string),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn stages_called(&self) -> Vec<CompileStage> {
        self.calls.lock().iter().map(|(s, _)| *s).collect()
    }
}

#[async_trait]
impl RemoteCompiler for Scripted {
    async fn to_intermediate(&self, source: Bytes) -> StarkcResult<String> {
        self.calls.lock().push((CompileStage::ToIntermediate, source));
        self.intermediate
            .clone()
            .map_err(|cause| StarkcError::remote(CompileStage::ToIntermediate, cause))
    }

    async fn to_final(&self, intermediate: Bytes) -> StarkcResult<String> {
        self.calls.lock().push((CompileStage::ToFinal, intermediate));
        self.final_repr
            .clone()
            .map_err(|cause| StarkcError::remote(CompileStage::ToFinal, cause))
    }
}

/// Accepts nothing.
struct ReadOnlyStore;

impl FileStore for ReadOnlyStore {
    fn read_file(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        bail!("no such file: {path}")
    }

    fn write_file(&self, path: &str, _bytes: &[u8]) -> anyhow::Result<()> {
        bail!("read-only store: {path}")
    }

    fn switch_active_file(&self, path: &str) -> anyhow::Result<()> {
        bail!("read-only store: {path}")
    }
}

struct Harness {
    compiler: Arc<Scripted>,
    store: Arc<MemoryFileStore>,
    catalog: Arc<ArtifactCatalog>,
    orchestrator: CompilationOrchestrator,
}

fn harness(compiler: Scripted) -> Harness {
    let compiler = Arc::new(compiler);
    let store = Arc::new(MemoryFileStore::new());
    let catalog = Arc::new(ArtifactCatalog::new());
    let orchestrator = CompilationOrchestrator::new(
        compiler.clone(),
        store.clone(),
        catalog.clone(),
        OutputConfig::default(),
    );
    Harness {
        compiler,
        store,
        catalog,
        orchestrator,
    }
}

fn valid_unit() -> SourceUnit {
    SourceUnit::capture("contracts/valid.cairo", "#[starknet::contract] mod valid {}").unwrap()
}

#[tokio::test]
async fn successful_compile_registers_selects_and_writes() {
    let h = harness(Scripted::new(Ok(FIXTURE), Ok(CASM)));
    let expected_hash = ContentHasher::new(HashPendingSignal::new())
        .hash_text(FIXTURE)
        .unwrap();
    let expected_abi = parse_intermediate(FIXTURE).unwrap().abi().clone();

    let out = h.orchestrator.compile(&valid_unit()).await.unwrap();

    assert!(out.is_persisted());
    assert_eq!(out.artifact.name, "valid.cairo");
    assert_eq!(out.artifact.abi, expected_abi);
    assert_eq!(out.artifact.class_hash, expected_hash);

    assert_eq!(h.catalog.len(), 1);
    let selected = h.catalog.selected().unwrap();
    assert!(Arc::ptr_eq(&selected, &out.artifact));

    assert_eq!(
        h.store.get("contracts/artifacts/valid.json").unwrap(),
        FIXTURE.as_bytes()
    );
    assert_eq!(
        h.store.get("contracts/artifacts/valid.casm").unwrap(),
        CASM.as_bytes()
    );
    assert_eq!(
        h.store.active_file().as_deref(),
        Some("contracts/artifacts/valid.json")
    );
}

#[tokio::test]
async fn stages_receive_previous_outputs() {
    let h = harness(Scripted::new(Ok(FIXTURE), Ok(CASM)));
    let unit = valid_unit();
    h.orchestrator.compile(&unit).await.unwrap();

    let calls = h.compiler.calls.lock();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, CompileStage::ToIntermediate);
    assert_eq!(&calls[0].1, unit.content());
    assert_eq!(calls[1].0, CompileStage::ToFinal);
    assert_eq!(calls[1].1.as_ref(), FIXTURE.as_bytes());
}

#[tokio::test]
async fn stage_one_failure_aborts_before_anything_changes() {
    let h = harness(Scripted::new(Err("HTTP 500 Internal Server Error"), Ok(CASM)));
    let mut pending = h.catalog.subscribe_hash_pending();

    let err = h.orchestrator.compile(&valid_unit()).await.unwrap_err();

    assert_matches!(
        err,
        StarkcError::RemoteCompilation { stage: CompileStage::ToIntermediate, .. }
    );
    assert_eq!(h.compiler.stages_called(), vec![CompileStage::ToIntermediate]);
    assert!(h.catalog.is_empty());
    assert!(h.store.paths().is_empty());
    assert!(!pending.has_changed().unwrap());
    assert!(!*pending.borrow_and_update());
}

#[tokio::test]
async fn stage_two_failure_registers_nothing() {
    let h = harness(Scripted::new(Ok(FIXTURE), Err("connection reset")));

    let err = h.orchestrator.compile(&valid_unit()).await.unwrap_err();

    assert_eq!(err.stage(), Some(CompileStage::ToFinal));
    assert!(h.catalog.is_empty());
    assert!(h.catalog.selected().is_none());
    assert!(h.store.paths().is_empty());
}

#[tokio::test]
async fn unparseable_intermediate_is_malformed_and_writes_nothing() {
    let h = harness(Scripted::new(Ok("error: Skipping compilation"), Ok(CASM)));

    let err = h.orchestrator.compile(&valid_unit()).await.unwrap_err();

    assert_matches!(err, StarkcError::MalformedIntermediate { .. });
    assert_eq!(
        h.compiler.stages_called(),
        vec![CompileStage::ToIntermediate, CompileStage::ToFinal]
    );
    assert!(h.catalog.is_empty());
    assert!(h.store.paths().is_empty());
    assert!(!h.catalog.is_hash_pending());
}

#[tokio::test]
async fn pending_flag_is_down_around_every_run() {
    let h = harness(Scripted::new(Ok(FIXTURE), Ok(CASM)));
    let mut pending = h.catalog.subscribe_hash_pending();

    assert!(!h.catalog.is_hash_pending());
    h.orchestrator.compile(&valid_unit()).await.unwrap();
    assert!(!h.catalog.is_hash_pending());

    // Raised and lowered once during hashing.
    assert!(pending.has_changed().unwrap());
    assert!(!*pending.borrow_and_update());
}

#[tokio::test]
async fn persistence_failure_keeps_registration() {
    let compiler = Arc::new(Scripted::new(Ok(FIXTURE), Ok(CASM)));
    let catalog = Arc::new(ArtifactCatalog::new());
    let orchestrator = CompilationOrchestrator::new(
        compiler,
        Arc::new(ReadOnlyStore),
        catalog.clone(),
        OutputConfig::default(),
    );

    let out = orchestrator.compile(&valid_unit()).await.unwrap();

    assert!(!out.is_persisted());
    assert_matches!(out.persistence_error, Some(StarkcError::Persistence { .. }));
    assert_eq!(catalog.len(), 1);
    assert!(Arc::ptr_eq(&catalog.selected().unwrap(), &out.artifact));
}

#[tokio::test]
async fn repeated_names_append_and_latest_is_selected() {
    let h = harness(Scripted::new(Ok(FIXTURE), Ok(CASM)));

    let first = h.orchestrator.compile(&valid_unit()).await.unwrap().artifact;
    let other = SourceUnit::capture("contracts/other.cairo", "mod other {}").unwrap();
    h.orchestrator.compile(&other).await.unwrap();
    let again = h.orchestrator.compile(&valid_unit()).await.unwrap().artifact;

    assert_eq!(h.catalog.len(), 3);
    let same_name = h.catalog.find_by_name("valid.cairo");
    assert_eq!(same_name.len(), 2);
    assert!(Arc::ptr_eq(&same_name[0], &first));
    assert!(Arc::ptr_eq(&h.catalog.selected().unwrap(), &again));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_runs_all_register() {
    let h = harness(Scripted::new(Ok(FIXTURE), Ok(CASM)));
    let orchestrator = Arc::new(h.orchestrator);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let orchestrator = orchestrator.clone();
        tasks.push(tokio::spawn(async move {
            let unit = SourceUnit::capture(format!("c{i}/token.cairo"), "mod token {}").unwrap();
            orchestrator.compile(&unit).await.map(|o| o.artifact.run_id)
        }));
    }

    let mut run_ids = Vec::new();
    for t in tasks {
        run_ids.push(t.await.unwrap().unwrap());
    }
    run_ids.sort();
    run_ids.dedup();

    assert_eq!(run_ids.len(), 8);
    assert_eq!(h.catalog.len(), 8);
    assert!(!h.catalog.is_hash_pending());
    let snap = h.catalog.snapshot();
    assert!(Arc::ptr_eq(
        snap.selected.as_ref().unwrap(),
        snap.artifacts.last().unwrap()
    ));
}
