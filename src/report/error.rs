//! Node report error types.

use thiserror::Error;

/// Errors raised while encoding or decoding a [`NodeStateReport`](super::NodeStateReport).
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// The report was written by an incompatible format version.
    #[error("Unsupported report version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
