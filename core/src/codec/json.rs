use super::{validate_postings, StorageCodec};
use crate::{IndexError, Postings, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;

/// Human-readable codec: one JSON object, term -> array of document id strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

/// Hand-written files sometimes carry bare integer ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocId {
    Text(String),
    Number(i64),
}

impl From<RawDocId> for String {
    fn from(raw: RawDocId) -> Self {
        match raw {
            RawDocId::Text(s) => s,
            RawDocId::Number(n) => n.to_string(),
        }
    }
}

impl StorageCodec for JsonCodec {
    fn encode(&self, postings: &Postings, writer: &mut dyn Write) -> Result<()> {
        serde_json::to_writer(writer, postings).map_err(|e| {
            if e.is_io() {
                IndexError::Io(e.into())
            } else {
                IndexError::encoding(e.to_string())
            }
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Postings> {
        let raw: HashMap<String, Vec<RawDocId>> = serde_json::from_slice(bytes)
            .map_err(|e| IndexError::decoding(format!("invalid JSON index: {e}")))?;
        let postings: Postings = raw
            .into_iter()
            .map(|(term, ids)| (term, ids.into_iter().map(String::from).collect()))
            .collect();
        validate_postings(&postings)?;
        Ok(postings)
    }
}
