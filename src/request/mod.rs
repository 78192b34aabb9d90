mod builder;
pub use builder::RequestBuilder;

use crate::file::UploadedFile;
use crate::header::Headers;

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use http::Uri;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

/// Form, query, and decoded-body fields keyed by name.
pub type Fields = Map<String, Value>;

/// A read-only, normalized view of an inbound HTTP request.
///
/// A `Request` is built once per inbound call from a snapshot of the
/// transport's raw inputs, either through [`RequestBuilder`] or from a
/// materialized [`http::Request`]. Every field is fixed at
/// construction; accessors never mutate, so a `Request` can be shared
/// freely across readers.
///
/// # Examples
///
/// ```
/// use inbound::{Bytes, Request};
///
/// let req = http::Request::post("/posts?draft=1")
///     .header("content-type", "application/json")
///     .body(Bytes::from(r#"{"title":"Hello"}"#))
///     .unwrap();
///
/// let req = Request::from(req);
/// assert_eq!(req.method(), "POST");
/// assert_eq!(req.path(), "/posts");
/// assert_eq!(req.input("title").and_then(|v| v.as_str()), Some("Hello"));
/// ```
#[derive(Debug, Default)]
pub struct Request {
    /// URL query pairs.
    pub(crate) query: Fields,

    /// Submitted form/body fields.
    pub(crate) body: Fields,

    /// Transport metadata under CGI-style names.
    pub(crate) server: BTreeMap<String, String>,

    /// Derived from `server` exactly once, at construction.
    pub(crate) headers: Headers,

    /// Request cookies.
    pub(crate) cookies: BTreeMap<String, String>,

    /// Uploaded-file descriptors.
    pub(crate) files: HashMap<String, UploadedFile>,

    /// The raw body payload.
    pub(crate) content: Option<Bytes>,

    // Write-once cache for the decoded JSON body.
    pub(crate) json: OnceCell<Option<Value>>,
}

impl Request {
    /// Build a [`Request`] from raw inputs.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Returns a field from the URL query string.
    pub fn query(&self, key: &str) -> Option<&Value> {
        self.query.get(key)
    }

    /// Returns a field submitted through the request body.
    pub fn post(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Returns a field regardless of the channel it arrived on.
    ///
    /// Body fields are checked first, then the query string, then the
    /// decoded JSON body. A source satisfies the lookup by presence:
    /// a key present with a `null` or empty value still wins over the
    /// sources after it.
    pub fn input(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.body.get(key) {
            return Some(value);
        }

        if let Some(value) = self.query.get(key) {
            return Some(value);
        }

        self.json()
            .and_then(Value::as_object)
            .and_then(|json| json.get(key))
    }

    /// Collects every input into one map.
    ///
    /// Layered as query, then body fields, then the decoded JSON body,
    /// with later layers overwriting earlier ones on key collision.
    /// Note that this is the opposite precedence direction from
    /// [`input`](Request::input), which prefers body fields; both
    /// orders are deliberate.
    pub fn all(&self) -> Fields {
        let mut all = self.query.clone();

        all.extend(self.body.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Some(json) = self.json().and_then(Value::as_object) {
            all.extend(json.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        all
    }

    /// The subset of [`all`](Request::all) restricted to the given keys.
    ///
    /// Keys with no input are simply absent from the result.
    pub fn only(&self, keys: &[&str]) -> Fields {
        self.all()
            .into_iter()
            .filter(|(key, _)| keys.contains(&key.as_str()))
            .collect()
    }

    /// [`all`](Request::all) without the given keys.
    ///
    /// Useful for dropping sensitive fields from the full input.
    pub fn except(&self, keys: &[&str]) -> Fields {
        self.all()
            .into_iter()
            .filter(|(key, _)| !keys.contains(&key.as_str()))
            .collect()
    }

    /// Returns a raw server variable.
    pub fn server(&self, key: &str) -> Option<&str> {
        self.server.get(key).map(String::as_str)
    }

    /// Returns a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The request's headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a cookie by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The request's cookies.
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// The effective HTTP method, always uppercase.
    ///
    /// The declared method defaults to `GET` and is overridden by a
    /// non-empty `_method` body field, or failing that a non-empty
    /// `x-http-method-override` header.
    pub fn method(&self) -> String {
        let declared = self.server("REQUEST_METHOD").unwrap_or("GET");

        self.body
            .get("_method")
            .and_then(Value::as_str)
            .or_else(|| self.header("x-http-method-override"))
            .filter(|value| !value.is_empty())
            .unwrap_or(declared)
            .to_ascii_uppercase()
    }

    /// The declared request URI, or `/` when absent or empty.
    pub fn uri(&self) -> &str {
        match self.server("REQUEST_URI") {
            Some(uri) if !uri.is_empty() => uri,
            _ => "/",
        }
    }

    /// The path component of [`uri`](Request::uri), or `/` when the
    /// URI yields no path.
    pub fn path(&self) -> String {
        self.uri()
            .parse::<Uri>()
            .ok()
            .map(|uri| uri.path().to_owned())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| "/".to_owned())
    }

    /// The raw body payload.
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// The body decoded as JSON, when the content type indicates JSON.
    ///
    /// Returns `None` for a non-JSON content type, an absent or empty
    /// body, or a body that fails to parse; decoding is best-effort
    /// and never surfaces an error. The decoded value may be any JSON
    /// type, but only objects participate in [`input`](Request::input)
    /// and [`all`](Request::all).
    pub fn json(&self) -> Option<&Value> {
        self.json.get_or_init(|| self.decode_json()).as_ref()
    }

    fn decode_json(&self) -> Option<Value> {
        if !self.is_json() {
            return None;
        }

        let raw = self.content.as_ref().filter(|raw| !raw.is_empty())?;
        serde_json::from_slice(raw).ok()
    }

    /// Returns an uploaded file by field name.
    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files.get(key)
    }

    /// The request's uploaded files.
    pub fn files(&self) -> &HashMap<String, UploadedFile> {
        &self.files
    }

    /// Whether the request was made via AJAX, per the
    /// `x-requested-with` header.
    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with")
            .map_or(false, |value| value.eq_ignore_ascii_case("xmlhttprequest"))
    }

    /// Whether the content type indicates a JSON body.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .map_or(false, |value| value.contains("application/json"))
    }

    /// The token carried by an `Authorization: Bearer <token>` header.
    ///
    /// The scheme is matched case-insensitively; the token itself is
    /// returned untouched.
    pub fn bearer_token(&self) -> Option<&str> {
        let auth = self.header("authorization")?;

        match auth.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => Some(&auth[7..]),
            _ => None,
        }
    }
}
