//! ABI string encoding for class hashing.
//!
//! The class hash commits to the ABI as text, not as structured data. The text
//! is the JSON the compiler emitted (same key order) re-serialized with a
//! space after every `,` and `:` separator, and every character outside
//! printable ASCII written as a lowercase `\uXXXX` escape (UTF-16 code units,
//! so astral characters become surrogate pairs). Whitespace inside string
//! values is untouched.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::errors::{StarkcError, StarkcResult};

/// Compact JSON with `", "` and `": "` separators and ASCII-only strings.
struct SpacedSeparators;

impl Formatter for SpacedSeparators {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Quotes, backslashes and C0 controls never reach here; DEL does.
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Serialize a value with spaced separators.
pub fn to_spaced_json(value: &Value) -> StarkcResult<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedSeparators);
    value
        .serialize(&mut ser)
        .map_err(|e| StarkcError::malformed(format!("failed to encode abi: {e}")))?;
    String::from_utf8(buf).map_err(|e| StarkcError::malformed(format!("abi is not utf-8: {e}")))
}

/// The exact text committed to by the class hash.
///
/// A string ABI is the flattened class form and is used verbatim.
pub fn abi_preimage(abi: &Value) -> StarkcResult<String> {
    match abi {
        Value::String(s) => Ok(s.clone()),
        other => to_spaced_json(other),
    }
}
