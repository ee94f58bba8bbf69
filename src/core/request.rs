//! Request line reading and parsing.

use std::io::{BufRead, Read};

use super::error::{RequestError, Result};

/// Longest request line accepted, terminator included.
pub const MAX_REQUEST_LINE: usize = 8 * 1024;

/// The first line of a request, split on whitespace.
///
/// Any part may be missing; nothing beyond the third token is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Option<String>,
    pub path: Option<String>,
    pub version: Option<String>,
}

impl RequestLine {
    /// Split a request line into method, path and version.
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace().map(str::to_string);
        Self {
            method: parts.next(),
            path: parts.next(),
            version: parts.next(),
        }
    }

    #[inline]
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or("")
    }

    #[inline]
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    #[inline]
    pub fn is_get(&self) -> bool {
        self.method() == "GET"
    }
}

/// Read one line (up to `\n` or EOF) from the peer.
///
/// Returns `Ok(None)` when the peer sent nothing before closing.
pub fn read_request_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    // One byte over the limit tells an over-long line apart from one that fits exactly
    let read = reader
        .by_ref()
        .take(MAX_REQUEST_LINE as u64 + 1)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    if buf.len() > MAX_REQUEST_LINE {
        return Err(RequestError::Malformed(format!(
            "request line exceeds {} bytes",
            MAX_REQUEST_LINE
        )));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| RequestError::Malformed("request line is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_full_line() {
        let line = RequestLine::parse("GET /foo HTTP/1.1\r\n");
        assert_eq!(line.method(), "GET");
        assert_eq!(line.path(), "/foo");
        assert_eq!(line.version.as_deref(), Some("HTTP/1.1"));
        assert!(line.is_get());
    }

    #[test]
    fn test_parse_partial_lines() {
        let line = RequestLine::parse("GET");
        assert!(line.is_get());
        assert_eq!(line.path, None);
        assert_eq!(line.path(), "");

        let line = RequestLine::parse("  \r\n");
        assert_eq!(line, RequestLine::default());
        assert!(!line.is_get());
    }

    #[test]
    fn test_method_is_case_sensitive() {
        assert!(!RequestLine::parse("get /foo HTTP/1.1").is_get());
    }

    #[test]
    fn test_read_stops_at_newline() {
        let mut input = Cursor::new(b"GET /a HTTP/1.1\r\nHost: x\r\n\r\n".to_vec());
        let line = read_request_line(&mut input).unwrap();
        assert_eq!(line.as_deref(), Some("GET /a HTTP/1.1\r\n"));
    }

    #[test]
    fn test_read_eof_without_newline() {
        let mut input = Cursor::new(b"GET /tail".to_vec());
        let line = read_request_line(&mut input).unwrap();
        assert_eq!(line.as_deref(), Some("GET /tail"));
    }

    #[test]
    fn test_read_empty_input() {
        let mut input = Cursor::new(Vec::new());
        assert_eq!(read_request_line(&mut input).unwrap(), None);
    }

    #[test]
    fn test_read_invalid_utf8() {
        let mut input = Cursor::new(b"GET /\xff\xfe HTTP/1.1\r\n".to_vec());
        let err = read_request_line(&mut input).unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
    }

    #[test]
    fn test_read_line_too_long() {
        let mut long = b"GET /".to_vec();
        long.extend(std::iter::repeat(b'a').take(MAX_REQUEST_LINE));
        long.extend_from_slice(b" HTTP/1.1\r\n");

        let err = read_request_line(&mut Cursor::new(long)).unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
    }

    #[test]
    fn test_read_line_at_limit() {
        let mut line = b"GET /".to_vec();
        line.extend(std::iter::repeat(b'a').take(MAX_REQUEST_LINE - line.len() - 1));
        line.push(b'\n');
        assert_eq!(line.len(), MAX_REQUEST_LINE);

        let read = read_request_line(&mut Cursor::new(line)).unwrap();
        assert_eq!(read.map(|l| l.len()), Some(MAX_REQUEST_LINE));
    }
}
