use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the snapshot tools.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `.tgz` archive could not be opened or traversed.
    #[error("Failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A selected member is no longer present in its archive.
    #[error("Member {member} not found in archive {archive}")]
    MemberNotFound { archive: PathBuf, member: String },

    /// A line could not be decoded as JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A line decoded as JSON but not as an object.
    #[error("JSON value is not a document")]
    NotADocument,

    /// A field the normalizer requires is absent or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A timestamp string did not match the provider's format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// `true` for errors raised while decoding a line, as opposed to a
    /// well-formed document that lacks something the normalizer needs.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, SnapshotError::JsonParse(_) | SnapshotError::NotADocument)
    }
}

/// Convenience alias used throughout the snapshot crates.
pub type Result<T> = std::result::Result<T, SnapshotError>;
