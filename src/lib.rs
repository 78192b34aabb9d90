//! A read-only, normalized view of an inbound HTTP request.

mod file;
mod header;
mod request;
mod snapshot;

pub use bytes::Bytes;
pub use file::UploadedFile;
pub use header::Headers;
pub use request::{Fields, Request, RequestBuilder};
pub use serde_json::Value;
