use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The request's headers, keyed by normalized name.
///
/// Names are lowercase with underscores replaced by dashes. Lookups
/// lowercase the given name, so `get("Content-Type")` and
/// `get("content-type")` answer the same.
#[derive(Clone, Default)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    /// Derive the header map from CGI-style server variables.
    ///
    /// Every `HTTP_*` entry becomes a header under its normalized name.
    /// `CONTENT_TYPE` and `CONTENT_LENGTH` are also included, since
    /// transports commonly supply them without the `HTTP_` prefix. No
    /// other entries become headers. When two keys normalize to the
    /// same name, the later one in iteration order wins.
    pub(crate) fn from_server(server: &BTreeMap<String, String>) -> Headers {
        let mut map = HashMap::with_capacity(server.len());

        for (key, value) in server {
            if let Some(name) = key.strip_prefix("HTTP_") {
                map.insert(normalize(name), value.clone());
            }
        }

        if let Some(value) = server.get("CONTENT_TYPE") {
            map.insert("content-type".to_owned(), value.clone());
        }

        if let Some(value) = server.get("CONTENT_LENGTH") {
            map.insert("content-length".to_owned(), value.clone());
        }

        Headers { map }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', "-")
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.map)
    }
}
