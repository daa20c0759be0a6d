//! Builders for container byte streams used across the test suites

use byteorder::{LittleEndian, WriteBytesExt};

pub const MAGIC_2_7: u32 = 0x0A0DF303;
pub const MAGIC_3_1: u32 = 0x0A0D0C4F;
pub const MAGIC_3_2: u32 = 0x0A0D0C6C;
pub const MAGIC_3_5_2: u32 = 0x0A0D0D17;

/// Appends container primitives and tagged objects to a byte buffer
#[derive(Default)]
pub struct Fixture {
    data: Vec<u8>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn byte(mut self, value: u8) -> Self {
        self.data.write_u8(value).unwrap();
        self
    }

    pub fn long(mut self, value: u32) -> Self {
        self.data.write_u32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.data.extend_from_slice(value);
        self
    }

    pub fn header(self, magic: u32, time_stamp: u32, size: Option<u32>) -> Self {
        let fixture = self.long(magic).long(time_stamp);
        match size {
            Some(size) => fixture.long(size),
            None => fixture,
        }
    }

    pub fn none(self) -> Self {
        self.byte(b'N')
    }

    pub fn short_ascii(self, value: &[u8]) -> Self {
        self.byte(b'z').byte(value.len() as u8).bytes(value)
    }

    pub fn interned(self, value: &[u8]) -> Self {
        self.byte(b'Z').byte(value.len() as u8).bytes(value)
    }

    pub fn string(self, value: &[u8]) -> Self {
        self.byte(b's').long(value.len() as u32).bytes(value)
    }

    pub fn reference(self, index: u32) -> Self {
        self.byte(b'r').long(index)
    }

    /// Tag and count of a tuple; the caller appends the items
    pub fn small_tuple(self, count: u8) -> Self {
        self.byte(b')').byte(count)
    }

    /// Tag and the five integer fields of a code object; the caller appends the rest
    pub fn code_header(self, fields: [u32; 5]) -> Self {
        fields.iter().fold(self.byte(b'c'), |fixture, field| fixture.long(*field))
    }

    /// A complete code object around `code` with empty tables
    pub fn minimal_code(self, code: &[u8]) -> Self {
        self.code_header([0, 0, 0, 1, 64])
            .string(code)
            .small_tuple(1)
            .none()
            .small_tuple(0)
            .small_tuple(0)
            .small_tuple(0)
            .small_tuple(0)
            .short_ascii(b"<test>")
            .interned(b"<module>")
            .long(1)
            .string(b"")
    }

    /// `levels` code objects, each holding the next as its only constant.
    /// The innermost has an empty constants tuple, so the deepest object sits
    /// `2 * levels - 1` levels below the outermost.
    pub fn nested_code(self, levels: usize) -> Self {
        let fixture = self.code_header([0, 0, 0, 1, 3]).string(&[100, 0, 0, 83]);
        let fixture = if levels > 1 {
            fixture.small_tuple(1).nested_code(levels - 1)
        } else {
            fixture.small_tuple(0)
        };
        fixture
            .small_tuple(0)
            .small_tuple(0)
            .small_tuple(0)
            .small_tuple(0)
            .short_ascii(b"<test>")
            .interned(b"inner")
            .long(1)
            .string(b"")
    }
}
