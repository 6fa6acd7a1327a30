pub mod builder;
pub mod codec;
pub mod document;
pub mod error;
pub mod index;
pub mod loader;
pub mod persist;

pub use builder::build_inverted_index;
pub use codec::{CodecKind, StorageCodec};
pub use document::Document;
pub use error::{IndexError, Result};
pub use index::{InvertedIndex, Postings};
pub use loader::load_documents;

/// Opaque document identifier, the first field of a document line.
pub type DocId = String;
/// Case-sensitive index key.
pub type Term = String;
