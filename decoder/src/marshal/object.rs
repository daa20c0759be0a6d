use std::borrow::Cow;
use std::io::Read;
use serde::Serialize;
use tracing::debug;
use crate::bytecode::{disassemble, Disassembly, OpcodeTable};
use crate::marshal::{Chunk, DecodeError, DecodeResult, Reader, Version};
use crate::module::DecoderConfig;

/// Object kinds, keyed by the low seven bits of a tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Code = b'c' as isize,
    String = b's' as isize,
    SmallTuple = b')' as isize,
    ShortAsciiInterned = b'Z' as isize,
    None = b'N' as isize,
    Reference = b'r' as isize,
    ShortAscii = b'z' as isize,
}

const CODE: u8 = Tag::Code as u8;
const STRING: u8 = Tag::String as u8;
const SMALL_TUPLE: u8 = Tag::SmallTuple as u8;
const SHORT_ASCII_INTERNED: u8 = Tag::ShortAsciiInterned as u8;
const NONE: u8 = Tag::None as u8;
const REFERENCE: u8 = Tag::Reference as u8;
const SHORT_ASCII: u8 = Tag::ShortAscii as u8;

impl Tag {
    /// High bit of a tag byte: the object is recorded in the back-reference table
    pub const FLAG_REF: u8 = 0x80;

    /// Resolve a raw tag byte, ignoring the reference flag
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte & !Self::FLAG_REF {
            CODE => Some(Tag::Code),
            STRING => Some(Tag::String),
            SMALL_TUPLE => Some(Tag::SmallTuple),
            SHORT_ASCII_INTERNED => Some(Tag::ShortAsciiInterned),
            NONE => Some(Tag::None),
            REFERENCE => Some(Tag::Reference),
            SHORT_ASCII => Some(Tag::ShortAscii),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// The single-character spelling used by the container format
    pub fn as_char(self) -> char {
        self.to_byte() as char
    }
}

/// A decoded object together with the tag byte that introduced it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    pub tag: Chunk<u8>,
    pub object: Object,
}

impl Node {
    pub fn kind(&self) -> Tag {
        self.object.kind()
    }

    /// Whether the tag byte carried the back-reference flag
    pub fn flagged(&self) -> bool {
        self.tag.value & Tag::FLAG_REF != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Object {
    #[default]
    None,
    SmallTuple(SmallTuple),
    ShortAscii(SizedBytes<u8>),
    ShortAsciiInterned(SizedBytes<u8>),
    String(SizedBytes<u32>),
    /// Index into the back-reference table; left unresolved
    Reference(Chunk<u32>),
    Code(Box<CodeObject>),
}

impl Object {
    pub fn kind(&self) -> Tag {
        match self {
            Object::None => Tag::None,
            Object::SmallTuple(_) => Tag::SmallTuple,
            Object::ShortAscii(_) => Tag::ShortAscii,
            Object::ShortAsciiInterned(_) => Tag::ShortAsciiInterned,
            Object::String(_) => Tag::String,
            Object::Reference(_) => Tag::Reference,
            Object::Code(_) => Tag::Code,
        }
    }

    /// Payload of the byte-string variants
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Object::ShortAscii(s) | Object::ShortAsciiInterned(s) => Some(s.as_bytes()),
            Object::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

/// Length-prefixed byte string; `L` is the width of the prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizedBytes<L> {
    pub size: Chunk<L>,
    pub value: Chunk<Vec<u8>>,
}

impl<L> SizedBytes<L> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.value.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmallTuple {
    pub size: Chunk<u8>,
    pub items: Vec<Node>,
}

/// A compiled function or module body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CodeObject {
    pub arg_count: Chunk<u32>,
    pub kw_only_arg_count: Chunk<u32>,
    pub num_locals: Chunk<u32>,
    pub stack_size: Chunk<u32>,
    pub flags: Chunk<u32>,
    pub code: Node,
    pub consts: Node,
    pub names: Node,
    pub varnames: Node,
    pub freevars: Node,
    pub cellvars: Node,
    pub filename: Node,
    pub name: Node,
    pub first_line: Chunk<u32>,
    pub line_table: Node,
    /// Instructions decoded from `code`, when it holds a byte string
    pub disassembly: Option<Disassembly>,
}

impl CodeObject {
    pub fn code_bytes(&self) -> Option<&[u8]> {
        self.code.object.as_bytes()
    }

    /// The five integer fields, in stream order
    pub fn integer_fields(&self) -> [(&'static str, &Chunk<u32>); 5] {
        [
            ("arg_count", &self.arg_count),
            ("kw_only_arg_count", &self.kw_only_arg_count),
            ("num_locals", &self.num_locals),
            ("stack_size", &self.stack_size),
            ("flags", &self.flags),
        ]
    }

    /// The nested objects between `code` and `first_line`, in stream order
    pub fn tables(&self) -> [(&'static str, &Node); 7] {
        [
            ("consts", &self.consts),
            ("names", &self.names),
            ("varnames", &self.varnames),
            ("freevars", &self.freevars),
            ("cellvars", &self.cellvars),
            ("filename", &self.filename),
            ("name", &self.name),
        ]
    }
}

/// Recursive parser for the tagged object stream
pub struct ObjectParser<'a, R> {
    reader: &'a mut Reader<R>,
    opcodes: Cow<'a, OpcodeTable>,
    max_depth: usize,
    depth: usize,
}

impl<'a, R: Read> ObjectParser<'a, R> {
    /// Create a parser for a container of the given version.
    ///
    /// Code payloads are disassembled with the configured opcode table, or the
    /// catalog table for `version` when none is configured.
    pub fn new(reader: &'a mut Reader<R>, version: Version, config: &'a DecoderConfig) -> Self {
        let opcodes = match &config.opcode_table {
            Some(table) => Cow::Borrowed(table),
            None => Cow::Owned(OpcodeTable::for_version(version)),
        };
        Self {
            reader,
            opcodes,
            max_depth: config.max_depth,
            depth: 0,
        }
    }

    /// Parse one object, including everything nested inside it
    pub fn parse(&mut self) -> DecodeResult<Node> {
        let tag = self.reader.read_byte()?;
        let kind = Tag::from_byte(tag.value).ok_or(DecodeError::InvalidType {
            tag: tag.value,
            offset: tag.offset,
        })?;

        if self.depth >= self.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                depth: self.max_depth,
                offset: tag.offset,
            });
        }

        self.depth += 1;
        let object = self.parse_payload(kind);
        self.depth -= 1;

        Ok(Node { tag, object: object? })
    }

    fn parse_payload(&mut self, kind: Tag) -> DecodeResult<Object> {
        let object = match kind {
            Tag::None => Object::None,
            Tag::Code => Object::Code(self.parse_code()?),
            Tag::String => {
                let size = self.reader.read_long()?;
                let value = self.reader.read_bytes(size.value as usize)?;
                Object::String(SizedBytes { size, value })
            }
            Tag::SmallTuple => {
                let size = self.reader.read_byte()?;
                let mut items = Vec::with_capacity(size.value as usize);
                for _ in 0..size.value {
                    items.push(self.parse()?);
                }
                Object::SmallTuple(SmallTuple { size, items })
            }
            Tag::ShortAscii => Object::ShortAscii(self.parse_short_ascii()?),
            Tag::ShortAsciiInterned => Object::ShortAsciiInterned(self.parse_short_ascii()?),
            Tag::Reference => Object::Reference(self.reader.read_long()?),
        };
        Ok(object)
    }

    fn parse_short_ascii(&mut self) -> DecodeResult<SizedBytes<u8>> {
        let size = self.reader.read_byte()?;
        let value = self.reader.read_bytes(size.value as usize)?;
        Ok(SizedBytes { size, value })
    }

    // Fields are filled in place on the heap so that each nesting level only
    // keeps a pointer on the call stack.
    fn parse_code(&mut self) -> DecodeResult<Box<CodeObject>> {
        let mut code = Box::<CodeObject>::default();

        for field in [
            &mut code.arg_count,
            &mut code.kw_only_arg_count,
            &mut code.num_locals,
            &mut code.stack_size,
            &mut code.flags,
        ] {
            *field = self.reader.read_long()?;
        }

        for field in [
            &mut code.code,
            &mut code.consts,
            &mut code.names,
            &mut code.varnames,
            &mut code.freevars,
            &mut code.cellvars,
            &mut code.filename,
            &mut code.name,
        ] {
            *field = self.parse()?;
        }

        code.first_line = self.reader.read_long()?;
        code.line_table = self.parse()?;

        self.finish_code(&mut code);
        Ok(code)
    }

    #[inline(never)]
    fn finish_code(&self, code: &mut CodeObject) {
        code.disassembly = code
            .code_bytes()
            .map(|bytes| disassemble(bytes, &self.opcodes));

        let label = String::from_utf8_lossy(code.name.object.as_bytes().unwrap_or_default());
        debug!(
            name = %label,
            first_line = code.first_line.value,
            instructions = code.disassembly.as_ref().map_or(0, |d| d.instructions.len()),
            "parsed code object"
        );
    }
}
