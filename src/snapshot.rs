//! Snapshots a materialized transport request into a [`Request`].
//!
//! This is the only place transport state is read; the core operates
//! purely on the constructed snapshot. Malformed pieces degrade
//! silently: an unparsable query string or form body becomes an empty
//! field map, and a non-UTF-8 header value is skipped.

use crate::request::{Fields, Request};

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use http::request::Parts;
use http::Version;
use serde::de::DeserializeOwned;
use serde_json::Value;

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Request {
        let (parts, body) = req.into_parts();

        let query = parts
            .uri
            .query()
            .map(|query| parse_fields(query.as_bytes()))
            .unwrap_or_default();

        let fields = if is_url_encoded(&parts) && !body.is_empty() {
            parse_fields(&body)
        } else {
            Fields::new()
        };

        let mut builder = Request::builder()
            .query(query)
            .body(fields)
            .server(server_vars(&parts))
            .cookies(cookies(&parts));

        if !body.is_empty() {
            builder = builder.content(body);
        }

        builder.build()
    }
}

/// Parse URL-encoded pairs into fields, empty on failure.
fn parse_fields(raw: &[u8]) -> Fields {
    decode_pairs::<HashMap<String, String>>(raw)
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

fn decode_pairs<T>(raw: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    serde_urlencoded::from_bytes(raw).unwrap_or_default()
}

fn is_url_encoded(parts: &Parts) -> bool {
    let mime = || {
        parts
            .headers
            .get(CONTENT_TYPE)?
            .to_str()
            .ok()?
            .parse::<mime::Mime>()
            .ok()
    };

    match mime() {
        Some(mime) => {
            mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED
        }
        None => false,
    }
}

/// Rebuild the CGI-style server map: the request line plus every
/// header under an upcased `HTTP_*` name, except `CONTENT_TYPE` and
/// `CONTENT_LENGTH` which are conventionally supplied bare.
fn server_vars(parts: &Parts) -> BTreeMap<String, String> {
    let mut server = BTreeMap::new();

    server.insert(
        "REQUEST_METHOD".to_owned(),
        parts.method.as_str().to_owned(),
    );
    server.insert("REQUEST_URI".to_owned(), parts.uri.to_string());
    server.insert(
        "SERVER_PROTOCOL".to_owned(),
        protocol(parts.version).to_owned(),
    );

    for (name, value) in &parts.headers {
        let value = match value.to_str() {
            Ok(value) => value,
            Err(_) => continue,
        };

        let key = if *name == CONTENT_TYPE {
            "CONTENT_TYPE".to_owned()
        } else if *name == CONTENT_LENGTH {
            "CONTENT_LENGTH".to_owned()
        } else {
            format!("HTTP_{}", name.as_str().to_ascii_uppercase().replace('-', "_"))
        };

        server.insert(key, value.to_owned());
    }

    server
}

fn protocol(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

fn cookies(parts: &Parts) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();

    let raw = match parts.headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
        Some(raw) => raw,
        None => return cookies,
    };

    for pair in raw.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            cookies.insert(name.to_owned(), value.to_owned());
        }
    }

    cookies
}

#[cfg(test)]
mod tests {
    use crate::Request;

    use bytes::Bytes;
    use http::header::HeaderValue;

    #[test]
    fn server_vars_use_cgi_names() {
        let req = http::Request::get("/posts?page=2")
            .header("x-requested-with", "XMLHttpRequest")
            .header("content-type", "text/plain")
            .body(Bytes::new())
            .unwrap();

        let req = Request::from(req);

        assert_eq!(req.server("REQUEST_METHOD"), Some("GET"));
        assert_eq!(req.server("REQUEST_URI"), Some("/posts?page=2"));
        assert_eq!(
            req.server("HTTP_X_REQUESTED_WITH"),
            Some("XMLHttpRequest")
        );
        assert_eq!(req.server("CONTENT_TYPE"), Some("text/plain"));
        assert_eq!(req.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn form_body_is_gated_on_content_type() {
        let req = http::Request::post("/submit")
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body(Bytes::from("name=Bob&age=42"))
            .unwrap();

        let req = Request::from(req);
        assert_eq!(req.post("name").and_then(|v| v.as_str()), Some("Bob"));
        assert_eq!(req.post("age").and_then(|v| v.as_str()), Some("42"));

        let req = http::Request::post("/submit")
            .header("content-type", "text/plain")
            .body(Bytes::from("name=Bob"))
            .unwrap();

        let req = Request::from(req);
        assert_eq!(req.post("name"), None);
        assert_eq!(req.content(), Some(&Bytes::from("name=Bob")));
    }

    #[test]
    fn server_protocol_tracks_the_version() {
        let req = http::Request::get("/").body(Bytes::new()).unwrap();
        let req = Request::from(req);
        assert_eq!(req.server("SERVER_PROTOCOL"), Some("HTTP/1.1"));

        let req = http::Request::get("/")
            .version(http::Version::HTTP_2)
            .body(Bytes::new())
            .unwrap();
        let req = Request::from(req);
        assert_eq!(req.server("SERVER_PROTOCOL"), Some("HTTP/2.0"));
    }

    #[test]
    fn cookie_header_is_split_into_pairs() {
        let req = http::Request::get("/")
            .header("cookie", "session=abc123; theme=dark")
            .body(Bytes::new())
            .unwrap();

        let req = Request::from(req);
        assert_eq!(req.cookie("session"), Some("abc123"));
        assert_eq!(req.cookie("theme"), Some("dark"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn non_utf8_header_value_is_skipped() {
        let mut req = http::Request::get("/").body(Bytes::new()).unwrap();
        req.headers_mut().insert(
            "x-raw",
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );

        let req = Request::from(req);
        assert_eq!(req.server("HTTP_X_RAW"), None);
        assert_eq!(req.header("x-raw"), None);
    }

    #[test]
    fn empty_body_means_absent_content() {
        let req = http::Request::get("/").body(Bytes::new()).unwrap();

        let req = Request::from(req);
        assert_eq!(req.content(), None);
    }
}
