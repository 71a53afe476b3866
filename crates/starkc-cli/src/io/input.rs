use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use starkc_core::model::SourceUnit;
use starkc_core::store::FileStore;

pub const SOURCE_EXT: &str = "cairo";

/// Read a Cairo source through the store. Anything without a `.cairo`
/// extension is refused before it reaches the network.
pub fn load_source(store: &dyn FileStore, path: &str) -> Result<SourceUnit> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if ext != SOURCE_EXT {
        bail!("file extension not supported: {path} (expected .{SOURCE_EXT})");
    }

    let content = store.read_file(path)?;
    if content.is_empty() {
        bail!("source file is empty: {path}");
    }
    Ok(SourceUnit::capture(path, content)?)
}

pub fn read_text_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// `--root` must exist before the store is opened on it.
pub fn require_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(())
    } else {
        Err(anyhow!("not a directory: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starkc_core::store::MemoryFileStore;

    #[test]
    fn rejects_other_extensions() {
        let store = MemoryFileStore::new();
        store.write_file("a.sol", b"contract A {}").unwrap();
        let err = load_source(&store, "a.sol").unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn loads_cairo_source() {
        let store = MemoryFileStore::new();
        store.write_file("src/a.cairo", b"mod a {}").unwrap();
        let unit = load_source(&store, "src/a.cairo").unwrap();
        assert_eq!(unit.name(), "a.cairo");
        assert_eq!(unit.content().as_ref(), b"mod a {}");
    }

    #[test]
    fn rejects_empty_and_missing() {
        let store = MemoryFileStore::new();
        store.write_file("empty.cairo", b"").unwrap();
        assert!(load_source(&store, "empty.cairo").is_err());
        assert!(load_source(&store, "missing.cairo").is_err());
    }

    #[test]
    fn require_dir_checks_existence() {
        let dir = tempfile::tempdir().unwrap();
        require_dir(dir.path()).unwrap();
        assert!(require_dir(dir.path().join("nope")).is_err());
    }
}
