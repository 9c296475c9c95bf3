//! Error types for the bridge wire format.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors produced while framing or parsing bridge traffic.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame was not valid JSON or did not match any known frame.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame was not valid UTF-8.
    #[error("frame is not valid utf-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Number of leading bytes that were valid.
        valid_up_to: usize,
    },

    /// A frame exceeded the configured maximum length.
    #[error("frame too long: {actual} bytes (limit {limit})")]
    FrameTooLong {
        /// Observed length.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },
}
