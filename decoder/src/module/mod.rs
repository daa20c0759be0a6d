mod config;
mod decoder;

pub use config::{DecoderConfig, DEFAULT_MAX_DEPTH};
pub use decoder::Decoder;

use serde::Serialize;
use crate::marshal::{Header, Node, Version};

/// A fully decoded container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PycModule {
    /// Where the bytes came from, usually a file path
    pub source: String,
    pub version: Version,
    pub header: Header,
    pub body: Node,
}
