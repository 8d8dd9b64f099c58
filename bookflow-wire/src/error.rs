//! Error types for wire encoding and decoding.

use thiserror::Error;

/// Error type for wire operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// Frame body ended before the requested value.
    #[error("truncated frame: needed {required} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Bytes required by the read.
        required: usize,
        /// Bytes remaining in the frame.
        available: usize,
        /// Offset of the failed read.
        offset: usize,
    },

    /// A value carried an unexpected type tag.
    #[error("unexpected tag at offset {offset}: expected {expected:#04x}, found {actual:#04x}")]
    UnexpectedTag {
        /// Tag the decoder was positioned for.
        expected: u8,
        /// Tag actually present.
        actual: u8,
        /// Offset of the tag byte.
        offset: usize,
    },

    /// An enum discriminant outside the known range.
    #[error("invalid enum value {value} at offset {offset}")]
    InvalidEnumValue {
        /// Discriminant found.
        value: u8,
        /// Offset of the discriminant.
        offset: usize,
    },

    /// A string back-reference pointed past the frame's string table.
    #[error("bad string back-reference {index}, table holds {table_len}")]
    BadBackReference {
        /// Referenced index.
        index: u16,
        /// Current string table length.
        table_len: usize,
    },

    /// A string field held invalid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string bytes.
        offset: usize,
    },

    /// Frame format byte did not match the configured encoding.
    #[error("format mismatch: expected {expected}, found byte {actual:#04x}")]
    FormatMismatch {
        /// Name of the configured encoding.
        expected: &'static str,
        /// First byte of the frame body.
        actual: u8,
    },

    /// The payload alias was not registered before decode.
    #[error("unknown payload alias {alias:?}")]
    UnknownAlias {
        /// Alias found on the wire.
        alias: String,
    },

    /// Frame decoded fully but bytes were left over.
    #[error("{remaining} trailing bytes after payload")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },

    /// Text codec failure.
    #[error("text codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required text field was missing or mistyped.
    #[error("malformed text frame: {message}")]
    MalformedText {
        /// Description of the defect.
        message: String,
    },
}

impl WireError {
    /// Creates a malformed-text error.
    pub fn malformed_text(message: impl Into<String>) -> Self {
        Self::MalformedText {
            message: message.into(),
        }
    }
}
