// pyc-decoder - Offset-annotated decoding of compiled-bytecode containers

pub mod bytecode;
pub mod marshal;
pub mod module;
pub mod render;

#[cfg(test)]
mod fixtures;

pub use bytecode::{disassemble, Disassembly, Instruction, OpcodeInfo, OpcodeTable};
pub use marshal::{Chunk, DecodeError, DecodeResult, Header, Node, Object, Version};
pub use module::{Decoder, DecoderConfig, PycModule};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
