//! Decoder configuration options

use crate::bytecode::OpcodeTable;

/// Default limit on object nesting.
///
/// Every nested code object costs two levels (the object and its constants
/// tuple), so this admits 128 nested functions or classes while staying well
/// inside a 2 MiB thread stack in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration options for a [`Decoder`](crate::Decoder)
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    /// Deepest allowed nesting of tuples and code objects
    pub max_depth: usize,
    /// Opcode table used instead of the catalog table for the container's version
    pub opcode_table: Option<OpcodeTable>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            opcode_table: None,
        }
    }
}

impl DecoderConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Disassemble code payloads with `table` regardless of the container version
    pub fn with_opcode_table(mut self, table: OpcodeTable) -> Self {
        self.opcode_table = Some(table);
        self
    }
}
