use crate::{
    cursor::Cursor,
    parse::{Parse, ParseError},
    StageKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageRecordParseError {
    #[error("unexpected EOF detected")]
    UnexpectedEof,
    #[error("`{keyword}` is not a known stage keyword")]
    UnknownStage { keyword: String },
    #[error("expected `{expected}` at offset {offset}")]
    MissingDelimiter { expected: char, offset: usize },
    #[error("stage record text at offset {offset} is not valid ASCII")]
    InvalidText { offset: usize },
}

impl ParseError for StageRecordParseError {
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

/// One compiled entry point: its stage, the stage metadata strings and the generated code.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageRecord {
    kind: StageKind,
    parameters: Vec<String>,
    code: Vec<u8>,
}

impl StageRecord {
    pub fn new(kind: StageKind, parameters: Vec<String>, code: Vec<u8>) -> Self {
        Self {
            kind,
            parameters,
            code,
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

impl Parse for StageRecord {
    type Error = StageRecordParseError;

    fn parse(cursor: &mut Cursor) -> Result<Self, Self::Error> {
        let offset = cursor.offset();
        let keyword = read_ascii(cursor, b':', offset)?;
        let kind = match StageKind::from_keyword(&keyword) {
            Some(kind) => kind,
            None => return Err(StageRecordParseError::UnknownStage { keyword }),
        };

        cursor.expect_delimiter::<Self::Error>(b'<')?;

        let offset = cursor.offset();
        let parameters = read_ascii(cursor, b'>', offset)?;
        let parameters = if parameters.is_empty() {
            vec![]
        } else {
            parameters.split(',').map(str::to_owned).collect()
        };

        // code length (4 bytes, little endian)
        let len = u32::from_le_bytes(*cursor.read::<Self::Error, 4>()?) as usize;
        let code = cursor.read_dynamic::<Self::Error>(len)?.to_vec();

        Ok(Self {
            kind,
            parameters,
            code,
        })
    }
}

fn read_ascii(
    cursor: &mut Cursor,
    delimiter: u8,
    offset: usize,
) -> Result<String, StageRecordParseError> {
    let bytes = cursor.read_until::<StageRecordParseError>(delimiter)?;

    if !bytes.is_ascii() {
        return Err(StageRecordParseError::InvalidText { offset });
    }

    Ok(String::from_utf8_lossy(bytes).into_owned())
}
