// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for shapefile decoding

use thiserror::Error;

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a shapefile
#[derive(Error, Debug)]
pub enum Error {
    /// Bad magic number, malformed header or structurally invalid record
    #[error("Invalid shapefile format at byte {offset}: {message}")]
    InvalidFormat { offset: u64, message: String },

    /// The stream ended before a fixed-width value could be read
    #[error("Unexpected end of input at byte {offset}: needed {needed} bytes, got {available}")]
    UnexpectedEndOfInput {
        offset: u64,
        needed: usize,
        available: usize,
    },

    #[error("Unsupported shape type {tag} in record {record} (byte {offset})")]
    UnsupportedShapeType { tag: i32, record: i32, offset: u64 },

    /// The file could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an [`Error::InvalidFormat`] at the given byte offset
    pub fn invalid_format(offset: u64, message: impl Into<String>) -> Self {
        Error::InvalidFormat {
            offset,
            message: message.into(),
        }
    }

    /// True when the stream ran dry while reading a value
    #[inline]
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Error::UnexpectedEndOfInput { .. })
    }
}
