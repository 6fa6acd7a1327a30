//! Storage codecs for the term -> document ids mapping.
//!
//! Files carry no header, so the reader must be told which codec wrote them.
//! Feeding one codec's output to another fails with a decoding error.

mod array;
mod bincode_codec;
mod json;

pub use self::array::{ArrayCodec, IdWidth};
pub use self::bincode_codec::BincodeCodec;
pub use self::json::JsonCodec;

use crate::{IndexError, Postings, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub trait StorageCodec: Send + Sync {
    fn encode(&self, postings: &Postings, writer: &mut dyn Write) -> Result<()>;

    fn decode(&self, bytes: &[u8]) -> Result<Postings>;

    fn to_bytes(&self, postings: &Postings) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(postings, &mut buf)?;
        Ok(buf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecKind {
    /// JSON object of term -> id strings.
    Json,
    /// Length-prefixed big-endian layout with 16-bit document ids.
    #[default]
    Array,
    /// Same layout as `Array` with 32-bit posting counts and 64-bit ids.
    WideArray,
    /// bincode serialization, ids kept as opaque strings.
    Bincode,
}

impl CodecKind {
    pub const ALL: [CodecKind; 4] = [CodecKind::Json, CodecKind::Array, CodecKind::WideArray, CodecKind::Bincode];

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Json => "json",
            CodecKind::Array => "array",
            CodecKind::WideArray => "wide-array",
            CodecKind::Bincode => "bincode",
        }
    }

    pub fn codec(self) -> Box<dyn StorageCodec> {
        match self {
            CodecKind::Json => Box::new(JsonCodec),
            CodecKind::Array => Box::new(ArrayCodec::new(IdWidth::Narrow)),
            CodecKind::WideArray => Box::new(ArrayCodec::new(IdWidth::Wide)),
            CodecKind::Bincode => Box::new(BincodeCodec),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "json_storage_policy" => Ok(CodecKind::Json),
            "array" | "array_storage_policy" => Ok(CodecKind::Array),
            "wide-array" | "wide_array" => Ok(CodecKind::WideArray),
            "bincode" => Ok(CodecKind::Bincode),
            other => Err(format!(
                "unknown codec '{other}', expected one of: json, array, wide-array, bincode"
            )),
        }
    }
}

/// Decoded mappings must hold the same invariants a built index does.
pub(crate) fn validate_postings(postings: &Postings) -> Result<()> {
    for (term, ids) in postings {
        if ids.is_empty() {
            return Err(IndexError::decoding(format!("term {term:?} has an empty posting list")));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(IndexError::decoding(format!("term {term:?} lists document {dup:?} twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codec_names() {
        for kind in CodecKind::ALL {
            assert_eq!(kind.name().parse::<CodecKind>().unwrap(), kind);
        }
        assert_eq!("array_storage_policy".parse::<CodecKind>().unwrap(), CodecKind::Array);
        assert_eq!(" JSON ".parse::<CodecKind>().unwrap(), CodecKind::Json);
        assert!("yaml".parse::<CodecKind>().is_err());
        assert_eq!(CodecKind::default(), CodecKind::Array);
    }

    #[test]
    fn codecs_do_not_read_each_other() {
        let mut postings = Postings::new();
        postings.insert("A_word".into(), vec!["123".into(), "3128".into()]);
        postings.insert("B_word".into(), vec!["2".into()]);

        for writer in CodecKind::ALL {
            let bytes = writer.codec().to_bytes(&postings).unwrap();
            for reader in CodecKind::ALL.into_iter().filter(|k| *k != writer) {
                let err = reader.codec().decode(&bytes).unwrap_err();
                assert!(
                    matches!(err, IndexError::Decoding(_)),
                    "{reader} accepted {writer} output: {err:?}"
                );
            }
        }
    }
}
