//! starkc data models.
//!
//! Models are mostly "dumb" data. Parsing lives in `crate::determinism::hashing`,
//! policy and I/O in the pipeline and the host.
//!
//! - `SourceUnit`: one Cairo file captured for a compile run
//! - `ParsedIntermediate`: the structured Sierra contract class
//! - `ClassHash`: the class identifier derived from it
//! - `Artifact`: the registered record in the catalog

use std::fmt;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::Value;
use starknet_crypto::Felt;
use uuid::Uuid;

use crate::errors::{StarkcError, StarkcResult};
use crate::version::ContractClassVersion;

/// A source file captured for a single compile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: String,
    name: String,
    content: Bytes,
}

impl SourceUnit {
    /// Capture `(path, content)`. The name is the last `/`-separated segment,
    /// the same rule the store uses to place outputs.
    pub fn capture(path: impl Into<String>, content: impl Into<Bytes>) -> StarkcResult<Self> {
        let path = path.into();
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Err(StarkcError::invalid_argument(format!(
                "source path has no file name: {path:?}"
            )));
        }
        Ok(Self {
            path,
            name,
            content: content.into(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

/// Sierra class hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassHash(pub Felt);

impl ClassHash {
    pub fn as_felt(&self) -> &Felt {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex_string()
    }
}

impl fmt::Display for ClassHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ClassHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// One Sierra entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    pub selector: Felt,
    pub function_idx: u64,
}

/// Entry points grouped the way the class hash consumes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointsByType {
    pub external: Vec<EntryPoint>,
    pub l1_handler: Vec<EntryPoint>,
    pub constructor: Vec<EntryPoint>,
}

/// A Sierra contract class parsed from the intermediate representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntermediate {
    /// Full document, keys in the order the compiler emitted them.
    pub document: Value,
    pub version: ContractClassVersion,
    pub sierra_program: Vec<Felt>,
    pub entry_points: EntryPointsByType,
}

impl ParsedIntermediate {
    /// The interface descriptor. `Null` only if the document was mutated after parsing.
    pub fn abi(&self) -> &Value {
        self.document.get("abi").unwrap_or(&Value::Null)
    }
}

/// A compiled, hashed and registered contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub source_path: String,
    pub abi: Value,
    pub class_hash: ClassHash,
    pub intermediate: Value,
    pub run_id: Uuid,
    /// RFC 3339, UTC.
    pub compiled_at: String,
}
