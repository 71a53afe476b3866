//! File store seam and output path derivation.
//!
//! The host owns the files: an editor workspace, a local directory, or memory
//! in tests. The pipeline only needs to write the two outputs and ask the host
//! to show the Sierra file.
//!
//! Paths are `/`-separated store paths, not OS paths.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::config::OutputConfig;

/// Host-side file operations used by the pipeline.
pub trait FileStore: Send + Sync {
    fn read_file(&self, path: &str) -> anyhow::Result<Vec<u8>>;
    fn write_file(&self, path: &str, bytes: &[u8]) -> anyhow::Result<()>;
    /// Ask the host to make `path` the active (visible) file.
    fn switch_active_file(&self, path: &str) -> anyhow::Result<()>;
}

/// `contracts/token/erc20.cairo` -> `contracts/token/artifacts`.
pub fn artifact_folder(source_path: &str, artifacts_dir: &str) -> String {
    match source_path.rfind('/') {
        Some(i) => format!("{}/{}", &source_path[..i], artifacts_dir),
        None => artifacts_dir.to_string(),
    }
}

/// `contracts/token/erc20.cairo` -> `erc20`.
pub fn base_name(source_path: &str) -> &str {
    let file = source_path.rsplit('/').next().unwrap_or(source_path);
    match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    }
}

/// Where one compile run writes its outputs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OutputPaths {
    pub intermediate_path: String,
    pub final_path: String,
}

pub fn derive_output_paths(source_path: &str, cfg: &OutputConfig) -> OutputPaths {
    let folder = artifact_folder(source_path, &cfg.artifacts_dir);
    let base = base_name(source_path);
    OutputPaths {
        intermediate_path: format!("{folder}/{base}.{}", cfg.intermediate_ext),
        final_path: format!("{folder}/{base}.{}", cfg.final_ext),
    }
}

/// A store rooted at a local directory.
///
/// Store paths resolve under `root`; paths that climb out of it are rejected.
#[derive(Debug)]
pub struct FsFileStore {
    root: PathBuf,
    active: Mutex<Option<String>>,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn active_file(&self) -> Option<String> {
        self.active.lock().clone()
    }

    fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let cleaned = path_clean::clean(path.trim_start_matches('/'));
        if cleaned.as_os_str().is_empty() || cleaned == Path::new(".") {
            bail!("empty store path");
        }
        if cleaned.is_absolute() || cleaned.starts_with("..") {
            bail!("path escapes store root: {path}");
        }
        Ok(self.root.join(cleaned))
    }
}

impl FileStore for FsFileStore {
    fn read_file(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full).with_context(|| format!("read {}", full.display()))
    }

    fn write_file(&self, path: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&full, bytes).with_context(|| format!("write {}", full.display()))
    }

    fn switch_active_file(&self, path: &str) -> anyhow::Result<()> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            bail!("cannot activate missing file: {}", full.display());
        }
        info!(path, "active file switched");
        *self.active.lock() = Some(path.to_string());
        Ok(())
    }
}

/// In-memory store for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    active: Mutex<Option<String>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().get(path).cloned()
    }

    /// Stored paths in lexical order.
    pub fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    pub fn active_file(&self) -> Option<String> {
        self.active.lock().clone()
    }
}

impl FileStore for MemoryFileStore {
    fn read_file(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.get(path).ok_or_else(|| anyhow!("no such file: {path}"))
    }

    fn write_file(&self, path: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.files.write().insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn switch_active_file(&self, path: &str) -> anyhow::Result<()> {
        if !self.files.read().contains_key(path) {
            bail!("cannot activate missing file: {path}");
        }
        *self.active.lock() = Some(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_and_base_name() {
        assert_eq!(artifact_folder("a/b/x.cairo", "artifacts"), "a/b/artifacts");
        assert_eq!(artifact_folder("x.cairo", "artifacts"), "artifacts");
        assert_eq!(base_name("a/b/x.cairo"), "x");
        assert_eq!(base_name("a/b/x.y.cairo"), "x.y");
        assert_eq!(base_name("Makefile"), "Makefile");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn backslash_is_not_a_separator() {
        let path = "contracts\\valid.cairo";
        let unit = crate::model::SourceUnit::capture(path, "").unwrap();
        assert_eq!(unit.name(), path);
        assert_eq!(base_name(path), "contracts\\valid");
        assert_eq!(
            derive_output_paths(path, &OutputConfig::default()).intermediate_path,
            "artifacts/contracts\\valid.json"
        );
    }

    #[test]
    fn output_paths_use_configured_extensions() {
        let paths = derive_output_paths("contracts/valid.cairo", &OutputConfig::default());
        assert_eq!(paths.intermediate_path, "contracts/artifacts/valid.json");
        assert_eq!(paths.final_path, "contracts/artifacts/valid.casm");
    }

    #[test]
    fn fs_store_round_trip_and_activate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(dir.path());

        store.write_file("c/artifacts/x.json", b"{}").unwrap();
        assert_eq!(store.read_file("c/artifacts/x.json").unwrap(), b"{}");
        assert!(dir.path().join("c/artifacts/x.json").is_file());

        store.switch_active_file("c/artifacts/x.json").unwrap();
        assert_eq!(store.active_file().as_deref(), Some("c/artifacts/x.json"));
        assert!(store.switch_active_file("c/artifacts/missing.json").is_err());
    }

    #[test]
    fn fs_store_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(dir.path());
        assert!(store.write_file("../outside.json", b"x").is_err());
        assert!(store.write_file("a/../../outside.json", b"x").is_err());
        assert!(store.write_file("a/../inside.json", b"x").is_ok());
    }

    #[test]
    fn memory_store_tracks_active_file() {
        let store = MemoryFileStore::new();
        assert!(store.read_file("x").is_err());
        store.write_file("b.json", b"1").unwrap();
        store.write_file("a.json", b"2").unwrap();
        assert_eq!(store.paths(), vec!["a.json", "b.json"]);
        store.switch_active_file("a.json").unwrap();
        assert_eq!(store.active_file().as_deref(), Some("a.json"));
    }
}
