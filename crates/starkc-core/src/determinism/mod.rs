//! Deterministic class identification.
//!
//! - `abi_json`: the ABI text the class hash commits to
//! - `hashing`: Sierra parsing and the class hash itself

pub mod abi_json;
pub mod hashing;

pub use hashing::{compute_class_hash, parse_intermediate, starknet_keccak, ContentHasher};
