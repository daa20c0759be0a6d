use serde::Serialize;
use tracing::warn;
use crate::bytecode::{Instruction, OpcodeTable};

/// Instructions decoded from a code payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disassembly {
    pub instructions: Vec<Instruction>,
    /// Offset of a trailing instruction whose argument bytes ran past the end of the payload
    pub truncated_at: Option<usize>,
}

impl Disassembly {
    pub fn is_truncated(&self) -> bool {
        self.truncated_at.is_some()
    }
}

/// Decode `code` left to right: one opcode byte, followed by an operand and an
/// argument byte when the table says the opcode takes an argument.
///
/// A truncated final instruction is dropped and its offset recorded.
pub fn disassemble(code: &[u8], table: &OpcodeTable) -> Disassembly {
    let mut instructions = Vec::new();
    let mut offset = 0;

    while offset < code.len() {
        let opcode = code[offset];
        let mut instruction = Instruction::new(offset, opcode, table.mnemonic(opcode));

        if table.has_argument(opcode) {
            match code.get(offset + 1..offset + 3) {
                Some(&[operand, argument]) => {
                    instruction = instruction.with_arguments(operand, argument);
                }
                _ => {
                    warn!(offset, opcode, len = code.len(), "truncated instruction");
                    return Disassembly {
                        instructions,
                        truncated_at: Some(offset),
                    };
                }
            }
        }

        offset += instruction.byte_len();
        instructions.push(instruction);
    }

    Disassembly {
        instructions,
        truncated_at: None,
    }
}
