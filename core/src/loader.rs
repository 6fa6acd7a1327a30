use crate::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a UTF-8 corpus into trimmed lines, in file order.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();
    for line in reader.lines() {
        documents.push(line?.trim().to_string());
    }
    tracing::info!(path = %path.display(), num_lines = documents.len(), "loaded documents");
    Ok(documents)
}
