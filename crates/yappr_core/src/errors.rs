use thiserror::Error;

#[derive(Debug, Error)]
pub enum YapprError {
    #[error("Invalid identifier format: {0}")]
    InvalidIdentifierFormat(String),

    #[error("Invalid identifier length: expected {expected} bytes, got {actual}")]
    InvalidIdentifierLength { expected: usize, actual: usize },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    #[error("Unsupported filter version {found} (expected {expected})")]
    UnsupportedFilterVersion { found: u32, expected: u32 },

    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, YapprError>;
