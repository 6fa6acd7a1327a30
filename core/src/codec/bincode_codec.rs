use super::{validate_postings, StorageCodec};
use crate::{IndexError, Postings, Result};
use ::bincode::{DefaultOptions, ErrorKind, Options};
use std::io::Write;

/// bincode 1.x with fixed-width integers; document ids stay opaque strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

fn options() -> impl Options {
    DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl StorageCodec for BincodeCodec {
    fn encode(&self, postings: &Postings, writer: &mut dyn Write) -> Result<()> {
        options().serialize_into(writer, postings).map_err(|e| match *e {
            ErrorKind::Io(io) => IndexError::Io(io),
            other => IndexError::encoding(other.to_string()),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Postings> {
        let postings: Postings = options()
            .with_limit(bytes.len() as u64)
            .deserialize(bytes)
            .map_err(|e| IndexError::decoding(format!("invalid bincode index: {e}")))?;
        validate_postings(&postings)?;
        Ok(postings)
    }
}
