use std::io::Read;
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use crate::marshal::{DecodeError, DecodeResult};

/// Upper bound on the buffer reserved up front for a single read.
/// Length prefixes come from the input, so larger reads grow as bytes arrive.
const PREALLOCATION_LIMIT: usize = 64 * 1024;

/// A single primitive read: where it started, what it decoded to, and the raw bytes consumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Chunk<T> {
    pub offset: u64,
    pub value: T,
    pub bytes: Vec<u8>,
}

impl<T> Chunk<T> {
    /// Number of bytes consumed by the read
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Offset of the first byte after this chunk
    pub fn end(&self) -> u64 {
        self.offset + self.bytes.len() as u64
    }
}

/// Forward-only cursor over a container stream.
///
/// Integers are decoded little-endian. The format stores them in the
/// byte order of the host that wrote the file, which in practice is
/// little-endian for every published interpreter build.
pub struct Reader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Current stream position, i.e. the number of bytes consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read one byte as an unsigned 8-bit integer
    pub fn read_byte(&mut self) -> DecodeResult<Chunk<u8>> {
        let (offset, bytes) = self.take_exact(1)?;
        Ok(Chunk {
            offset,
            value: bytes[0],
            bytes,
        })
    }

    /// Read a 4-byte unsigned integer
    pub fn read_long(&mut self) -> DecodeResult<Chunk<u32>> {
        let (offset, bytes) = self.take_exact(4)?;
        Ok(Chunk {
            offset,
            value: LittleEndian::read_u32(&bytes),
            bytes,
        })
    }

    /// Read `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> DecodeResult<Chunk<Vec<u8>>> {
        let (offset, bytes) = self.take_exact(count)?;
        Ok(Chunk {
            offset,
            value: bytes.clone(),
            bytes,
        })
    }

    fn take_exact(&mut self, needed: usize) -> DecodeResult<(u64, Vec<u8>)> {
        let offset = self.position;
        let mut bytes = Vec::with_capacity(needed.min(PREALLOCATION_LIMIT));
        (&mut self.inner).take(needed as u64).read_to_end(&mut bytes)?;
        self.position += bytes.len() as u64;

        if bytes.len() < needed {
            return Err(DecodeError::StreamTruncated {
                offset,
                needed,
                available: bytes.len(),
            });
        }
        Ok((offset, bytes))
    }
}
