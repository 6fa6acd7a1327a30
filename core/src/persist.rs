use crate::codec::CodecKind;
use crate::{Postings, Result};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

/// Encode fully in memory, then write, so an encoding failure never leaves a
/// partial file behind.
pub fn save_postings(path: &Path, postings: &Postings, codec: CodecKind) -> Result<()> {
    let bytes = codec.codec().to_bytes(postings)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let mut f = File::create(path)?;
    f.write_all(&bytes)?;
    f.flush()?;
    tracing::info!(path = %path.display(), %codec, num_terms = postings.len(), bytes = bytes.len(), "dumped inverted index");
    Ok(())
}

pub fn load_postings(path: &Path, codec: CodecKind) -> Result<Postings> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let postings = codec.codec().decode(&buf)?;
    tracing::info!(path = %path.display(), %codec, num_terms = postings.len(), "loaded inverted index");
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexError;

    #[test]
    fn failed_encoding_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        let mut postings = Postings::new();
        postings.insert("word".into(), vec!["40000".into()]);

        let err = save_postings(&path, &postings, CodecKind::Array).unwrap_err();
        assert!(matches!(err, IndexError::Encoding(_)));
        assert!(!path.exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/index.json");
        let mut postings = Postings::new();
        postings.insert("word".into(), vec!["1".into()]);

        save_postings(&path, &postings, CodecKind::Json).unwrap();
        assert_eq!(load_postings(&path, CodecKind::Json).unwrap(), postings);
    }

    #[test]
    fn missing_index_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_postings(&dir.path().join("absent.bin"), CodecKind::Array).unwrap_err();
        assert!(matches!(err, IndexError::Io(_)));
    }
}
