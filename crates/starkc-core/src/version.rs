//! Version helpers.
//!
//! The class hash algorithm is pinned to one contract class version. A Sierra
//! document declaring any other version is rejected rather than hashed with
//! the wrong domain.

use crate::errors::{StarkcError, StarkcResult};

/// Known Sierra contract class versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractClassVersion {
    V0_1_0,
}

impl ContractClassVersion {
    /// Parse the `contract_class_version` field (e.g. "0.1.0").
    pub fn parse(s: &str) -> StarkcResult<Self> {
        match s {
            "0.1.0" => Ok(Self::V0_1_0),
            _ => Err(StarkcError::malformed(format!(
                "unsupported contract_class_version: {s}"
            ))),
        }
    }

    /// The value carried in the Sierra document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_1_0 => "0.1.0",
        }
    }

    /// Short string prefixed to the class hash preimage.
    pub fn hash_domain(&self) -> &'static str {
        match self {
            Self::V0_1_0 => "CONTRACT_CLASS_V0.1.0",
        }
    }
}
