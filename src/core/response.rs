//! Fixed-format plain text responses.

use bytes::{BufMut, Bytes, BytesMut};
use http::StatusCode;

/// Content type sent with every response.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Pre-allocated static bodies.
mod static_bodies {
    use super::*;
    pub static METHOD_NOT_ALLOWED: Bytes = Bytes::from_static(b"Method Not Allowed");
}

/// A status line, one `Content-Type` header and a body.
///
/// Serialized without `Content-Length`; the connection is closed after
/// the body, which delimits it.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
}

impl Response {
    /// 200 OK greeting for `path`.
    pub fn hello(path: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::from(format!("Hello from {}!", path)),
        }
    }

    /// 405 Method Not Allowed (uses static body).
    #[inline]
    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            body: static_bodies::METHOD_NOT_ALLOWED.clone(),
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Wire form: `HTTP/1.1 <code> <reason>\r\nContent-Type: text/plain\r\n\r\n<body>`.
    pub fn to_bytes(&self) -> Bytes {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\n\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or(""),
            CONTENT_TYPE_TEXT
        );

        let mut buf = BytesMut::with_capacity(head.len() + self.body.len());
        buf.put_slice(head.as_bytes());
        buf.put_slice(&self.body);
        buf.freeze()
    }
}
