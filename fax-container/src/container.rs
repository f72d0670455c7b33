use crate::{
    cursor::Cursor,
    parse::{Parse, ParseError},
    StageKind, StageRecord, StageRecordParseError,
};
use thiserror::Error;

/// Leading bytes of every container.
pub const CONTAINER_MAGIC: [u8; 6] = *b"cshdr\n";

/// File extension given to containers on disk.
pub const CONTAINER_EXTENSION: &str = "cshdr";

/// Bytes that frame a stage record. They may never appear inside a stage
/// keyword or a parameter.
pub const STRUCTURAL_BYTES: [u8; 4] = [b':', b'<', b'>', b','];

#[derive(Error, Debug)]
pub enum ContainerEncodeError {
    #[error("the `{stage}` stage carries {len} bytes of code which does not fit in 32 bits")]
    CodeTooLarge { stage: StageKind, len: usize },
}

#[derive(Error, Debug)]
pub enum ContainerParseError {
    #[error("unexpected EOF detected")]
    UnexpectedEof,
    #[error("`{magic:?}` is not a valid container signature")]
    InvalidMagic { magic: [u8; 6] },
    #[error("expected `{expected}` at offset {offset}")]
    MissingDelimiter { expected: char, offset: usize },
    #[error("failed to parse stage record #{index}: {source}")]
    StageRecord {
        index: usize,
        #[source]
        source: StageRecordParseError,
    },
}

impl ParseError for ContainerParseError {
    fn error_unexpected_eof() -> Self {
        Self::UnexpectedEof
    }

    fn error_missing_delimiter(expected: u8, offset: usize) -> Self {
        Self::MissingDelimiter {
            expected: char::from(expected),
            offset,
        }
    }
}

/// All compiled stages of one shader module, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Container {
    stages: Vec<StageRecord>,
}

impl Container {
    pub fn new(stages: Vec<StageRecord>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[StageRecord] {
        &self.stages
    }

    pub fn push(&mut self, stage: StageRecord) {
        self.stages.push(stage);
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn encode(&self) -> Result<Vec<u8>, ContainerEncodeError> {
        let mut data = Vec::from(CONTAINER_MAGIC);

        for stage in &self.stages {
            let keyword = stage.kind().keyword();
            debug_assert!(!contains_structural_byte(keyword));

            data.extend_from_slice(keyword.as_bytes());
            data.extend_from_slice(b":<");

            for (index, parameter) in stage.parameters().iter().enumerate() {
                debug_assert!(!contains_structural_byte(parameter));

                if index != 0 {
                    data.push(b',');
                }

                data.extend_from_slice(parameter.as_bytes());
            }

            data.push(b'>');

            let code = stage.code();
            let len = match u32::try_from(code.len()) {
                Ok(len) => len,
                Err(_) => {
                    return Err(ContainerEncodeError::CodeTooLarge {
                        stage: stage.kind(),
                        len: code.len(),
                    });
                }
            };

            data.extend_from_slice(&len.to_le_bytes());
            data.extend_from_slice(code);
        }

        Ok(data)
    }

    pub fn parse(buf: impl AsRef<[u8]>) -> Result<Self, ContainerParseError> {
        let mut cursor = Cursor::new(buf.as_ref());

        let magic = *cursor.read::<ContainerParseError, 6>()?;
        if magic != CONTAINER_MAGIC {
            return Err(ContainerParseError::InvalidMagic { magic });
        }

        let mut stages = Vec::new();

        while !cursor.is_eof() {
            let stage = StageRecord::parse(&mut cursor).map_err(|source| {
                ContainerParseError::StageRecord {
                    index: stages.len(),
                    source,
                }
            })?;
            stages.push(stage);
        }

        Ok(Self { stages })
    }
}

fn contains_structural_byte(text: &str) -> bool {
    text.bytes().any(|byte| STRUCTURAL_BYTES.contains(&byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_container() -> Container {
        Container::new(vec![
            StageRecord::new(
                StageKind::Vertex,
                vec!["Vertex3D".to_owned(), "Normal".to_owned()],
                vec![0x03, 0x02, 0x23, 0x07, 0xff],
            ),
            StageRecord::new(
                StageKind::Fragment,
                vec!["R8G8B8A8_UNORM".to_owned(), "D32_FLOAT".to_owned()],
                vec![0x00; 300],
            ),
            StageRecord::new(StageKind::Amplification, vec![], vec![]),
        ])
    }

    #[test]
    fn test_container_encode_layout() {
        let container = Container::new(vec![StageRecord::new(
            StageKind::Vertex,
            vec!["Vertex3D".to_owned(), "Normal".to_owned()],
            vec![0xaa, 0xbb],
        )]);

        let mut expected = b"cshdr\nvertex:<Vertex3D,Normal>".to_vec();
        expected.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0xaa, 0xbb]);

        assert_eq!(container.encode().unwrap(), expected);
    }

    #[test]
    fn test_container_encode_empty_parameters() {
        let container = Container::new(vec![StageRecord::new(
            StageKind::Compute,
            vec![],
            vec![0x01],
        )]);

        let mut expected = b"cshdr\ncompute:<>".to_vec();
        expected.extend_from_slice(&[0x01, 0x00, 0x00, 0x00, 0x01]);

        assert_eq!(container.encode().unwrap(), expected);
    }

    #[test]
    fn test_container_code_length_is_little_endian() {
        let encoded = sample_container().encode().unwrap();
        let header = b"cshdr\nvertex:<Vertex3D,Normal>".len()
            + 4
            + 5
            + b"fragment:<R8G8B8A8_UNORM,D32_FLOAT>".len();

        assert_eq!(&encoded[header..header + 4], &[0x2c, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_container_round_trip() {
        let container = sample_container();
        let parsed = Container::parse(container.encode().unwrap()).unwrap();

        assert_eq!(parsed.stages().len(), 3);
        assert_eq!(parsed, container);
        assert_eq!(parsed.stages()[1].code().len(), 300);
        assert!(parsed.stages()[2].parameters().is_empty());
    }

    #[test]
    fn test_container_parse_magic_only() {
        let parsed = Container::parse(CONTAINER_MAGIC).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_container_parse_invalid_magic() {
        let result = Container::parse(b"shader\nvertex:<>\0\0\0\0");
        assert!(matches!(
            result,
            Err(ContainerParseError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_container_parse_truncated_code() {
        let container = Container::new(vec![StageRecord::new(
            StageKind::Miss,
            vec![],
            vec![1, 2, 3, 4],
        )]);
        let mut encoded = container.encode().unwrap();
        encoded.truncate(encoded.len() - 2);

        assert!(matches!(
            Container::parse(&encoded),
            Err(ContainerParseError::StageRecord {
                index: 0,
                source: StageRecordParseError::UnexpectedEof
            })
        ));
    }

    #[test]
    fn test_container_parse_unknown_stage() {
        let mut data = Vec::from(CONTAINER_MAGIC);
        data.extend_from_slice(b"pixel:<>\0\0\0\0");

        match Container::parse(&data) {
            Err(ContainerParseError::StageRecord {
                index: 0,
                source: StageRecordParseError::UnknownStage { keyword },
            }) => assert_eq!(keyword, "pixel"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_container_parse_missing_open_delimiter() {
        let mut data = Vec::from(CONTAINER_MAGIC);
        data.extend_from_slice(b"miss:>\0\0\0\0");

        assert!(matches!(
            Container::parse(&data),
            Err(ContainerParseError::StageRecord {
                index: 0,
                source: StageRecordParseError::MissingDelimiter {
                    expected: '<',
                    offset: 11
                }
            })
        ));
    }
}
