mod disassembler;
mod instruction;
mod opcode;

pub use disassembler::{disassemble, Disassembly};
pub use instruction::Instruction;
pub use opcode::{OpcodeInfo, OpcodeTable, HAVE_ARGUMENT};
