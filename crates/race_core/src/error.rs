use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning an encoded race scenario into a [`RaceLog`].
///
/// [`RaceLog`]: crate::telemetry::RaceLog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("empty race payload")]
    Empty,

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("gzip decompression failed: {0}")]
    Decompress(String),

    /// A read ran past the end of the buffer
    #[error("payload too short: needed {needed} bytes at offset {offset}, payload has {len}")]
    TooShort { needed: usize, offset: usize, len: usize },

    /// A length/count/size field is negative or smaller than its record layout
    #[error("invalid {field}: {value}")]
    InvalidLength { field: &'static str, value: i64 },

    #[error("participant count {count} exceeds target mask width {max}")]
    TooManyParticipants { count: usize, max: usize },

    #[error("frame {index} is earlier than the frame before it")]
    UnorderedFrames { index: usize },

    #[error("more than one participant has finish order 0")]
    DuplicateWinner,
}

#[derive(Error, Debug)]
pub enum RaceError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("participant index {index} out of range (race has {count} participants)")]
    OutOfRange { index: usize, count: usize },

    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RaceError {
    /// Whether a batch should skip the offending race and keep going.
    ///
    /// `OutOfRange` is an integration bug on the caller side and must surface.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RaceError::Decode(_) => true,
            RaceError::MalformedMetadata(_) => true,
            RaceError::Io { .. } => true,
            RaceError::OutOfRange { .. } => false,
        }
    }
}

impl From<serde_json::Error> for RaceError {
    fn from(err: serde_json::Error) -> Self {
        RaceError::MalformedMetadata(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RaceError>;
