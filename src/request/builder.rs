use super::{Fields, Request};
use crate::file::UploadedFile;
use crate::header::Headers;

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use once_cell::sync::OnceCell;

/// Builds a [`Request`] from raw inputs.
///
/// Every input defaults to empty or absent. [`build`] derives the
/// header map from the server variables; headers are never supplied
/// directly.
///
/// [`build`]: RequestBuilder::build
#[derive(Debug, Default)]
pub struct RequestBuilder {
    query: Fields,
    body: Fields,
    server: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    files: HashMap<String, UploadedFile>,
    content: Option<Bytes>,
}

impl RequestBuilder {
    /// Create a [`RequestBuilder`] instance.
    pub fn new() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Set the URL query fields.
    pub fn query(mut self, query: Fields) -> Self {
        self.query = query;
        self
    }

    /// Set the submitted form/body fields.
    pub fn body(mut self, body: Fields) -> Self {
        self.body = body;
        self
    }

    /// Set the transport metadata, under CGI-style names such as
    /// `REQUEST_METHOD`, `REQUEST_URI`, and `HTTP_*` header lines.
    pub fn server(mut self, server: BTreeMap<String, String>) -> Self {
        self.server = server;
        self
    }

    /// Set the request cookies.
    pub fn cookies(mut self, cookies: BTreeMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Set the uploaded-file descriptors.
    pub fn files(mut self, files: HashMap<String, UploadedFile>) -> Self {
        self.files = files;
        self
    }

    /// Set the raw body payload.
    pub fn content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Snapshot the inputs into an immutable [`Request`].
    pub fn build(self) -> Request {
        let headers = Headers::from_server(&self.server);

        Request {
            query: self.query,
            body: self.body,
            server: self.server,
            headers,
            cookies: self.cookies,
            files: self.files,
            content: self.content,
            json: OnceCell::new(),
        }
    }
}
