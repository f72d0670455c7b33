use crate::cursor::Cursor;

/// A value read from the front of a container cursor.
pub trait Parse: Sized {
    type Error: ParseError;

    fn parse(cursor: &mut Cursor) -> Result<Self, Self::Error>;
}

/// Errors the cursor can raise on behalf of a parser.
pub trait ParseError {
    fn error_unexpected_eof() -> Self;

    /// `expected` was not found at `offset`.
    fn error_missing_delimiter(expected: u8, offset: usize) -> Self;
}
