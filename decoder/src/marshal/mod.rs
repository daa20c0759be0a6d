//! The tagged container format: byte reader, header and object graph

mod header;
mod object;
mod reader;
mod version;

pub use header::Header;
pub use object::{CodeObject, Node, Object, ObjectParser, SizedBytes, SmallTuple, Tag};
pub use reader::{Chunk, Reader};
pub use version::{Version, MAGIC_NUMBERS};

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding a container
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Unrecognized version: magic number {magic:#010x} matches no known release")]
    UnrecognizedVersion { magic: u32 },

    #[error("Stream truncated at offset {offset}: needed {needed} bytes, {available} available")]
    StreamTruncated {
        offset: u64,
        needed: usize,
        available: usize,
    },

    #[error("Invalid type: tag {tag:#04x} at offset {offset}")]
    InvalidType { tag: u8, offset: u64 },

    #[error("Object nesting deeper than {depth} levels at offset {offset}")]
    DepthLimitExceeded { depth: usize, offset: u64 },
}

/// Result type for decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;
