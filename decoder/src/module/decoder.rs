use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};
use crate::marshal::{DecodeResult, Header, ObjectParser, Reader};
use crate::module::{DecoderConfig, PycModule};

/// Entry point for decoding containers
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with custom configuration
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a container file
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> DecodeResult<PycModule> {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.decode(path.display().to_string(), BufReader::new(file))
    }

    /// Decode a container from any byte source; `source` names it in the output
    pub fn decode<R: Read>(&self, source: impl Into<String>, input: R) -> DecodeResult<PycModule> {
        let source = source.into();
        let mut reader = Reader::new(input);

        let (header, version) = Header::parse(&mut reader)?;
        debug!(
            source = %source,
            version = %version,
            header_bytes = header.byte_len(),
            "decoding body"
        );

        let body = ObjectParser::new(&mut reader, version, &self.config).parse()?;
        info!(source = %source, bytes = reader.position(), "decoded container");

        Ok(PycModule {
            source,
            version,
            header,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;
    use crate::fixtures::{Fixture, MAGIC_2_7, MAGIC_3_5_2};
    use crate::marshal::{Chunk, DecodeError, Node, Object, Tag, Version};
    use crate::module::DEFAULT_MAX_DEPTH;
    use crate::render::xml;

    fn span<T>(chunk: &Chunk<T>) -> (u64, u64) {
        (chunk.offset, chunk.end())
    }

    /// Every chunk under `node`, in the order the parser read them
    fn collect_spans(node: &Node, spans: &mut Vec<(u64, u64)>) {
        spans.push(span(&node.tag));
        match &node.object {
            Object::None => {}
            Object::SmallTuple(tuple) => {
                spans.push(span(&tuple.size));
                for item in &tuple.items {
                    collect_spans(item, spans);
                }
            }
            Object::ShortAscii(s) | Object::ShortAsciiInterned(s) => {
                spans.push(span(&s.size));
                spans.push(span(&s.value));
            }
            Object::String(s) => {
                spans.push(span(&s.size));
                spans.push(span(&s.value));
            }
            Object::Reference(index) => spans.push(span(index)),
            Object::Code(code) => {
                for (_, field) in code.integer_fields() {
                    spans.push(span(field));
                }
                collect_spans(&code.code, spans);
                for (_, table) in code.tables() {
                    collect_spans(table, spans);
                }
                spans.push(span(&code.first_line));
                collect_spans(&code.line_table, spans);
            }
        }
    }

    #[test]
    fn test_decode_module() {
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 1_600_000_000, Some(11))
            .minimal_code(&[100, 0, 0, 83])
            .build();

        let module = Decoder::default().decode("mod.pyc", Cursor::new(data)).unwrap();
        assert_eq!(module.source, "mod.pyc");
        assert_eq!(module.version, Version::new(3, 5, 2));
        assert_eq!(module.header.size.as_ref().map(|c| c.value), Some(11));
        assert_eq!(module.body.kind(), Tag::Code);
        assert_eq!(module.body.tag.offset, 12);
    }

    #[test]
    fn test_decode_old_header_layout() {
        let data = Fixture::new().header(MAGIC_2_7, 0, None).none().build();

        let module = Decoder::default().decode("old.pyc", Cursor::new(data)).unwrap();
        assert!(module.header.size.is_none());
        assert_eq!(module.body.object, Object::None);
        assert_eq!(module.body.tag.offset, 8);
    }

    #[test]
    fn test_decode_file() {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 0, Some(0))
            .minimal_code(&[9])
            .build();
        std::fs::write(file.path(), data).expect("Failed to write fixture");

        let module = Decoder::default().decode_file(file.path()).unwrap();
        assert_eq!(module.source, file.path().display().to_string());
        match &module.body.object {
            Object::Code(code) => {
                let disassembly = code.disassembly.as_ref().unwrap();
                assert_eq!(disassembly.instructions[0].mnemonic, "NOP");
            }
            other => panic!("Expected Code, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_missing_file() {
        let result = Decoder::default().decode_file("/nonexistent/path/missing.pyc");
        assert!(matches!(result, Err(DecodeError::IoError(_))));
    }

    #[test]
    fn test_unrecognized_version_stops_before_body() {
        let data = Fixture::new().long(0x0A0D0000).long(0).long(0).none().build();
        let result = Decoder::default().decode("bad.pyc", Cursor::new(data));
        assert!(matches!(result, Err(DecodeError::UnrecognizedVersion { magic: 0x0A0D0000 })));
    }

    #[test]
    fn test_invalid_tag_in_body_fails_whole_decode() {
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 0, Some(0))
            .small_tuple(2)
            .none()
            .byte(b'?')
            .build();
        let result = Decoder::default().decode("bad.pyc", Cursor::new(data));
        match result.unwrap_err() {
            DecodeError::InvalidType { tag, offset } => {
                assert_eq!(tag, b'?');
                assert_eq!(offset, 15);
            }
            other => panic!("Expected InvalidType, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_body() {
        let data = Fixture::new().header(MAGIC_3_5_2, 0, Some(0)).byte(b'c').long(0).build();
        let result = Decoder::default().decode("short.pyc", Cursor::new(data));
        assert!(matches!(result, Err(DecodeError::StreamTruncated { offset: 17, .. })));
    }

    #[test]
    fn test_configured_depth_limit() {
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 0, Some(0))
            .small_tuple(1)
            .small_tuple(1)
            .none()
            .build();
        let decoder = Decoder::new(DecoderConfig::new().with_max_depth(2));
        assert_eq!(decoder.config().max_depth, 2);
        let result = decoder.decode("deep.pyc", Cursor::new(data));
        assert!(matches!(result, Err(DecodeError::DepthLimitExceeded { depth: 2, offset: 16 })));
    }

    #[test]
    fn test_chunks_cover_stream_without_gaps() {
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 1_600_000_000, Some(42))
            .code_header([1, 0, 2, 3, 67])
            .string(&[124, 0, 0, 83, 9])
            .small_tuple(4)
            .none()
            .short_ascii(b"x")
            .byte(b'r' | 0x80)
            .long(0)
            .minimal_code(&[100, 0])
            .small_tuple(1)
            .interned(b"print")
            .small_tuple(1)
            .short_ascii(b"a")
            .small_tuple(0)
            .small_tuple(0)
            .short_ascii(b"m.py")
            .interned(b"f")
            .long(7)
            .string(&[0, 1, 6, 1])
            .build();

        let module = Decoder::default().decode("spans.pyc", Cursor::new(data.clone())).unwrap();

        let header = &module.header;
        let mut spans = vec![span(&header.magic_number), span(&header.time_stamp)];
        spans.extend(header.size.as_ref().map(span));
        collect_spans(&module.body, &mut spans);

        assert_eq!(spans[0].0, 0);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "gap or overlap between {:?} and {:?}", pair[0], pair[1]);
        }
        assert_eq!(spans.last().map(|s| s.1), Some(data.len() as u64));
    }

    #[test]
    fn test_default_depth_limit_decodes_and_renders() {
        let levels = DEFAULT_MAX_DEPTH / 2;
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 0, Some(0))
            .nested_code(levels)
            .build();

        let module = Decoder::default().decode("deep.pyc", Cursor::new(data)).unwrap();
        let document = xml::render(&module);
        assert_eq!(document.matches("<code offset=").count(), levels);
        assert_eq!(document.matches("code=\"RETURN_VALUE\"").count(), levels);
    }

    #[test]
    fn test_default_depth_limit_rejects_one_more_level() {
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 0, Some(0))
            .small_tuple(1)
            .nested_code(DEFAULT_MAX_DEPTH / 2)
            .build();

        let result = Decoder::default().decode("deeper.pyc", Cursor::new(data));
        assert!(matches!(
            result,
            Err(DecodeError::DepthLimitExceeded { depth: DEFAULT_MAX_DEPTH, .. })
        ));
    }
}
