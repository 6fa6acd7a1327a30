use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value does not fit the layout of the selected codec.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// File content is inconsistent with the layout of the selected codec.
    #[error("Decoding error: {0}")]
    Decoding(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        IndexError::Encoding(msg.into())
    }

    pub fn decoding(msg: impl Into<String>) -> Self {
        IndexError::Decoding(msg.into())
    }
}
