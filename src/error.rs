//! Error types for Escher record codec operations.

use thiserror::Error;

/// Errors raised while decoding or mutating Escher drawing records.
#[derive(Error, Debug)]
pub enum EscherError {
    /// Buffer ended before a required fixed-size field. The record is
    /// unreadable; no partial object is produced.
    #[error("truncated {context}: need {needed} bytes, have {available}")]
    Truncated {
        /// What was being read when the buffer ran out
        context: &'static str,
        /// Bytes the field requires
        needed: usize,
        /// Bytes remaining in the buffer
        available: usize,
    },

    /// Record type tag outside the supported variant set. The stream reader
    /// owns dispatch; receiving one of these here is its contract violation.
    #[error("unsupported record type 0x{0:04X}")]
    UnsupportedRecordType(u16),

    /// A setter received a value outside its contract.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
}

/// Result type for Escher codec operations.
pub type Result<T> = std::result::Result<T, EscherError>;
