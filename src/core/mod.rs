//! Core request/response handling.
//!
//! The protocol is one request line in, at most one response out:
//!
//! - [`RequestLine`] - the whitespace-split first line
//! - [`Response`] - fixed-format plain text response
//! - [`RequestHandler`] - seam used by the listener, [`HelloHandler`] by default
//! - [`RequestError`] - failures contained within a single connection
//!
//! # Example
//!
//! ```rust,ignore
//! use pooled_httpd::core::{respond, Outcome};
//!
//! let outcome = respond(&mut stream)?;
//! if let Outcome::Responded { status, .. } = outcome {
//!     println!("answered with {}", status);
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;

pub use error::{RequestError, Result};
pub use handler::{respond, HelloHandler, Outcome, RequestHandler};
pub use request::{read_request_line, RequestLine, MAX_REQUEST_LINE};
pub use response::{Response, CONTENT_TYPE_TEXT};
