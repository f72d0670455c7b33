use crate::parse::ParseError;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    pub fn ensure_bytes<E: ParseError>(&self, len: usize) -> Result<(), E> {
        if self.remaining() < len {
            return Err(E::error_unexpected_eof());
        }

        Ok(())
    }

    pub fn read<E: ParseError, const N: usize>(&mut self) -> Result<&'a [u8; N], E> {
        self.ensure_bytes::<E>(N)?;

        let bytes = match self.buf[self.offset..self.offset + N].try_into() {
            Ok(bytes) => bytes,
            Err(_) => return Err(E::error_unexpected_eof()),
        };
        self.offset += N;

        Ok(bytes)
    }

    pub fn read_dynamic<E: ParseError>(&mut self, len: usize) -> Result<&'a [u8], E> {
        self.ensure_bytes::<E>(len)?;

        let bytes = &self.buf[self.offset..self.offset + len];
        self.offset += len;

        Ok(bytes)
    }

    /// Reads bytes up to (not including) `delimiter` and consumes the delimiter.
    pub fn read_until<E: ParseError>(&mut self, delimiter: u8) -> Result<&'a [u8], E> {
        let rest = &self.buf[self.offset..];
        let len = match rest.iter().position(|&byte| byte == delimiter) {
            Some(len) => len,
            None => return Err(E::error_unexpected_eof()),
        };

        let bytes = &rest[..len];
        self.offset += len + 1;

        Ok(bytes)
    }

    /// Consumes `delimiter`, failing if the next byte is anything else.
    pub fn expect_delimiter<E: ParseError>(&mut self, delimiter: u8) -> Result<(), E> {
        let offset = self.offset;
        let [byte] = *self.read::<E, 1>()?;

        if byte != delimiter {
            return Err(E::error_missing_delimiter(delimiter, offset));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseError;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Eof,
        Delimiter(u8, usize),
    }

    impl ParseError for TestError {
        fn error_unexpected_eof() -> Self {
            TestError::Eof
        }

        fn error_missing_delimiter(expected: u8, offset: usize) -> Self {
            TestError::Delimiter(expected, offset)
        }
    }

    #[test]
    fn test_cursor_read_until_consumes_delimiter() {
        let mut cursor = Cursor::new(b"vertex:<rest");

        assert_eq!(cursor.read_until::<TestError>(b':').unwrap(), b"vertex");
        assert_eq!(cursor.offset(), 7);
        cursor.expect_delimiter::<TestError>(b'<').unwrap();
        assert_eq!(cursor.remaining(), 4);
    }

    #[test]
    fn test_cursor_read_past_end() {
        let mut cursor = Cursor::new(&[1, 2, 3]);

        assert_eq!(cursor.read::<TestError, 4>(), Err(TestError::Eof));
        assert_eq!(cursor.read_dynamic::<TestError>(3).unwrap(), &[1, 2, 3]);
        assert!(cursor.is_eof());
        assert_eq!(cursor.read_until::<TestError>(b'>'), Err(TestError::Eof));
    }

    #[test]
    fn test_cursor_expect_delimiter_reports_offset() {
        let mut cursor = Cursor::new(b"miss>");

        cursor.read_dynamic::<TestError>(4).unwrap();
        assert_eq!(
            cursor.expect_delimiter::<TestError>(b'<'),
            Err(TestError::Delimiter(b'<', 4))
        );
        assert_eq!(cursor.expect_delimiter::<TestError>(b'<'), Err(TestError::Eof));
    }
}
