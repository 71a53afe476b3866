//! Sierra class hashing.
//!
//! The class hash is the identifier Starknet uses to address a declared class,
//! so it must match the network's computation bit for bit:
//!
//! ```text
//! poseidon([
//!     "CONTRACT_CLASS_V0.1.0",
//!     poseidon(EXTERNAL entry points),
//!     poseidon(L1_HANDLER entry points),
//!     poseidon(CONSTRUCTOR entry points),
//!     starknet_keccak(abi text),
//!     poseidon(sierra_program),
//! ])
//! ```
//!
//! Entry points contribute `selector, function_idx` pairs in document order.
//! Hashing works on the parsed class, so formatting of the source text never
//! affects the result.

use serde_json::Value;
use sha3::{Digest, Keccak256};
use starknet_crypto::{poseidon_hash_many, Felt};

use crate::catalog::HashPendingSignal;
use crate::determinism::abi_json::abi_preimage;
use crate::errors::{StarkcError, StarkcResult};
use crate::model::{ClassHash, EntryPoint, EntryPointsByType, ParsedIntermediate};
use crate::version::ContractClassVersion;

/// Computes class hashes and reports them on the catalog's pending signal.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    pending: HashPendingSignal,
}

impl ContentHasher {
    pub fn new(pending: HashPendingSignal) -> Self {
        Self { pending }
    }

    /// Parse the intermediate representation into a Sierra class.
    pub fn parse(&self, text: &str) -> StarkcResult<ParsedIntermediate> {
        parse_intermediate(text)
    }

    /// Compute the class hash. The pending signal is raised for the duration
    /// of the call and lowered on every exit path.
    pub fn compute_id(&self, parsed: &ParsedIntermediate) -> StarkcResult<ClassHash> {
        let _pending = self.pending.begin();
        compute_class_hash(parsed)
    }

    /// Parse and hash in one pending window.
    pub fn hash_text(&self, text: &str) -> StarkcResult<ClassHash> {
        let _pending = self.pending.begin();
        let parsed = parse_intermediate(text)?;
        compute_class_hash(&parsed)
    }
}

/// Parse Sierra contract class JSON.
pub fn parse_intermediate(text: &str) -> StarkcResult<ParsedIntermediate> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| StarkcError::malformed(format!("invalid json: {e}")))?;

    let obj = document
        .as_object()
        .ok_or_else(|| StarkcError::malformed("expected a JSON object"))?;

    let version = match obj.get("contract_class_version") {
        Some(Value::String(s)) => ContractClassVersion::parse(s)?,
        Some(_) => {
            return Err(StarkcError::malformed(
                "contract_class_version must be a string",
            ))
        }
        None => return Err(StarkcError::malformed("missing contract_class_version")),
    };

    match obj.get("abi") {
        Some(Value::Array(_)) | Some(Value::String(_)) => {}
        Some(_) => return Err(StarkcError::malformed("abi must be an array or a string")),
        None => return Err(StarkcError::malformed("missing abi")),
    }

    let program = obj
        .get("sierra_program")
        .ok_or_else(|| StarkcError::malformed("missing sierra_program"))?
        .as_array()
        .ok_or_else(|| StarkcError::malformed("sierra_program must be an array"))?;
    let sierra_program = program
        .iter()
        .enumerate()
        .map(|(i, v)| felt_from_value(v, &format!("sierra_program[{i}]")))
        .collect::<StarkcResult<Vec<_>>>()?;

    let groups = obj
        .get("entry_points_by_type")
        .ok_or_else(|| StarkcError::malformed("missing entry_points_by_type"))?;
    if !groups.is_object() {
        return Err(StarkcError::malformed(
            "entry_points_by_type must be an object",
        ));
    }
    let entry_points = EntryPointsByType {
        external: entry_point_group(groups, "EXTERNAL")?,
        l1_handler: entry_point_group(groups, "L1_HANDLER")?,
        constructor: entry_point_group(groups, "CONSTRUCTOR")?,
    };

    Ok(ParsedIntermediate {
        document,
        version,
        sierra_program,
        entry_points,
    })
}

fn entry_point_group(groups: &Value, key: &str) -> StarkcResult<Vec<EntryPoint>> {
    // A group the compiler omitted hashes like an empty one.
    let Some(group) = groups.get(key) else {
        return Ok(Vec::new());
    };
    let items = group
        .as_array()
        .ok_or_else(|| StarkcError::malformed(format!("{key} entry points must be an array")))?;

    items
        .iter()
        .enumerate()
        .map(|(i, ep)| {
            let at = format!("{key}[{i}]");
            let selector = ep
                .get("selector")
                .ok_or_else(|| StarkcError::malformed(format!("{at}: missing selector")))?;
            let function_idx = ep
                .get("function_idx")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    StarkcError::malformed(format!("{at}: function_idx must be an unsigned integer"))
                })?;
            Ok(EntryPoint {
                selector: felt_from_value(selector, &format!("{at}.selector"))?,
                function_idx,
            })
        })
        .collect()
}

fn felt_from_value(v: &Value, at: &str) -> StarkcResult<Felt> {
    match v {
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => Felt::from_hex(s)
            .map_err(|_| StarkcError::malformed(format!("{at}: not a felt: {s}"))),
        Value::String(s) => Felt::from_dec_str(s)
            .map_err(|_| StarkcError::malformed(format!("{at}: not a felt: {s}"))),
        Value::Number(n) => n
            .as_u64()
            .map(Felt::from)
            .ok_or_else(|| StarkcError::malformed(format!("{at}: not a felt: {n}"))),
        _ => Err(StarkcError::malformed(format!("{at}: expected a felt"))),
    }
}

/// Compute the Sierra class hash of a parsed class.
pub fn compute_class_hash(parsed: &ParsedIntermediate) -> StarkcResult<ClassHash> {
    let abi_text = abi_preimage(parsed.abi())?;

    let elements = [
        Felt::from_bytes_be_slice(parsed.version.hash_domain().as_bytes()),
        hash_entry_points(&parsed.entry_points.external),
        hash_entry_points(&parsed.entry_points.l1_handler),
        hash_entry_points(&parsed.entry_points.constructor),
        starknet_keccak(abi_text.as_bytes()),
        poseidon_hash_many(&parsed.sierra_program),
    ];

    Ok(ClassHash(poseidon_hash_many(&elements)))
}

fn hash_entry_points(entry_points: &[EntryPoint]) -> Felt {
    let flat: Vec<Felt> = entry_points
        .iter()
        .flat_map(|ep| [ep.selector, Felt::from(ep.function_idx)])
        .collect();
    poseidon_hash_many(&flat)
}

/// Keccak-256 truncated to the low 250 bits.
pub fn starknet_keccak(data: &[u8]) -> Felt {
    let mut digest: [u8; 32] = Keccak256::digest(data).into();
    digest[0] &= 0x03;
    Felt::from_bytes_be(&digest)
}
