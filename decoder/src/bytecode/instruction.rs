use serde::Serialize;

/// One decoded instruction from a code payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Byte offset within the instruction stream
    pub offset: usize,
    pub mnemonic: String,
    pub opcode: u8,
    pub operand: Option<u8>,
    pub argument: Option<u8>,
}

impl Instruction {
    pub fn new(offset: usize, opcode: u8, mnemonic: impl Into<String>) -> Self {
        Self {
            offset,
            mnemonic: mnemonic.into(),
            opcode,
            operand: None,
            argument: None,
        }
    }

    pub fn with_arguments(mut self, operand: u8, argument: u8) -> Self {
        self.operand = Some(operand);
        self.argument = Some(argument);
        self
    }

    pub fn has_arguments(&self) -> bool {
        self.operand.is_some()
    }

    /// Number of bytes the instruction occupies in the stream
    pub fn byte_len(&self) -> usize {
        if self.has_arguments() { 3 } else { 1 }
    }
}
