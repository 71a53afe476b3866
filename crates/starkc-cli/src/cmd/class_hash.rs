use anyhow::Result;
use serde::Serialize;
use starkc_core::catalog::HashPendingSignal;
use starkc_core::determinism::ContentHasher;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ClassHashOut {
    pub file: String,
    pub class_hash: String,
}

pub async fn run(file: &str) -> Result<()> {
    let text = input::read_text_file(file)?;

    // Standalone hashing has no catalog to report to.
    let hasher = ContentHasher::new(HashPendingSignal::new());
    let class_hash = hasher.hash_text(&text)?;

    if output::is_json() {
        output::print(&ClassHashOut {
            file: file.to_string(),
            class_hash: class_hash.to_hex(),
        })?;
    } else {
        output::status(true, file, &class_hash.to_hex())?;
    }
    Ok(())
}
