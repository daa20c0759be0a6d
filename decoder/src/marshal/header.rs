use std::io::Read;
use serde::Serialize;
use tracing::debug;
use crate::marshal::{Chunk, DecodeError, DecodeResult, Reader, Version};

/// Fixed-layout prefix of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub magic_number: Chunk<u32>,
    pub time_stamp: Chunk<u32>,
    /// Source size, present only from 3.2 onwards
    pub size: Option<Chunk<u32>>,
}

impl Header {
    /// Parse the header and resolve the container version.
    ///
    /// The version must be known before the size field is considered: reading
    /// it for an older release (or skipping it for a newer one) would shift
    /// every later offset.
    pub fn parse<R: Read>(reader: &mut Reader<R>) -> DecodeResult<(Header, Version)> {
        let magic_number = reader.read_long()?;
        let version = Version::from_magic(magic_number.value).ok_or(
            DecodeError::UnrecognizedVersion {
                magic: magic_number.value,
            },
        )?;

        let time_stamp = reader.read_long()?;
        let size = if version.has_size_field() {
            Some(reader.read_long()?)
        } else {
            None
        };

        debug!(
            version = %version,
            time_stamp = time_stamp.value,
            size = ?size.as_ref().map(|chunk| chunk.value),
            "parsed header"
        );

        Ok((
            Header {
                magic_number,
                time_stamp,
                size,
            },
            version,
        ))
    }

    /// Total number of header bytes consumed
    pub fn byte_len(&self) -> usize {
        self.magic_number.size()
            + self.time_stamp.size()
            + self.size.as_ref().map_or(0, |chunk| chunk.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::fixtures::{Fixture, MAGIC_2_7, MAGIC_3_1, MAGIC_3_2, MAGIC_3_5_2};

    #[test]
    fn test_parse_with_size_field() {
        let data = Fixture::new().header(MAGIC_3_5_2, 1_500_000_000, Some(120)).build();
        let mut reader = Reader::new(Cursor::new(data));

        let (header, version) = Header::parse(&mut reader).unwrap();
        assert_eq!(version, Version::new(3, 5, 2));
        assert_eq!(header.magic_number.value, MAGIC_3_5_2);
        assert_eq!(header.magic_number.offset, 0);
        assert_eq!(header.time_stamp.value, 1_500_000_000);
        assert_eq!(header.time_stamp.offset, 4);

        let size = header.size.as_ref().expect("size field for 3.5.2");
        assert_eq!(size.value, 120);
        assert_eq!(size.offset, 8);
        assert_eq!(header.byte_len(), 12);
        assert_eq!(reader.position(), 12);
    }

    #[test]
    fn test_size_field_read_from_3_2() {
        let data = Fixture::new().header(MAGIC_3_2, 0, Some(7)).build();
        let mut reader = Reader::new(Cursor::new(data));

        let (header, _) = Header::parse(&mut reader).unwrap();
        assert_eq!(header.size.map(|chunk| chunk.value), Some(7));
    }

    #[test]
    fn test_no_size_field_before_3_2() {
        for magic in [MAGIC_2_7, MAGIC_3_1] {
            // The byte after the timestamp is the first object tag and must stay unread
            let data = Fixture::new().header(magic, 42, None).none().build();
            let mut reader = Reader::new(Cursor::new(data));

            let (header, version) = Header::parse(&mut reader).unwrap();
            assert!(version < Version::new(3, 2, 0));
            assert!(header.size.is_none());
            assert_eq!(header.byte_len(), 8);
            assert_eq!(reader.position(), 8);
        }
    }

    #[test]
    fn test_unrecognized_magic() {
        let data = Fixture::new().long(0xDEADBEEF).long(0).long(0).build();
        let mut reader = Reader::new(Cursor::new(data));

        match Header::parse(&mut reader).unwrap_err() {
            DecodeError::UnrecognizedVersion { magic } => assert_eq!(magic, 0xDEADBEEF),
            other => panic!("Expected UnrecognizedVersion, got {:?}", other),
        }
        // Nothing past the magic number is consumed
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_truncated_size_field() {
        let data = Fixture::new().long(MAGIC_3_5_2).long(0).byte(1).build();
        let mut reader = Reader::new(Cursor::new(data));

        match Header::parse(&mut reader).unwrap_err() {
            DecodeError::StreamTruncated { offset, .. } => assert_eq!(offset, 8),
            other => panic!("Expected StreamTruncated, got {:?}", other),
        }
    }
}
