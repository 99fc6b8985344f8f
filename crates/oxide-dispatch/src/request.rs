//! Request metadata: methods, path parameters, and the request source.

use std::collections::HashMap;
use std::ops::Index;
use std::str::FromStr;

use crate::error::RouterError;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Every routable method, as registered by `all`.
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Options,
        Self::Patch,
        Self::Head,
    ];

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Parses a `|`-separated method list such as `"GET|POST"`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnknownMethod`] for any unrecognised entry.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, RouterError> {
        list.split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for Method {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(RouterError::UnknownMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Path parameters extracted from the URI, in declaration order.
///
/// Parameters are positional: `params[0]` is the first placeholder of the
/// pattern. Lookup by placeholder name is also available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates new empty path params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Gets a parameter value by placeholder name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a parameter value by position.
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|(_, v)| v.as_str())
    }

    /// Parses a parameter as a specific type.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` when the pattern had no placeholders.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the values in positional order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Index<usize> for PathParams {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.params[index].1
    }
}

/// Where the dispatcher reads request metadata from.
pub trait RequestSource {
    /// The raw request method, e.g. `"GET"`.
    fn method(&self) -> &str;

    /// The request path, query string already removed.
    fn path(&self) -> &str;

    /// The `Host` the request was addressed to, if known.
    fn host(&self) -> Option<&str>;

    /// Looks up a request header, case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Static mount point stripped from the path before matching.
    fn base_path(&self) -> &str {
        "/"
    }
}

/// An in-memory request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Raw HTTP method.
    pub method: String,
    /// Decoded request path without the query string.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Mount point of the application.
    pub base_path: String,
}

impl Request {
    /// Creates a new request from a raw method and URI.
    ///
    /// The query string is split off and the path is percent-decoded.
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (uri, None),
        };

        Self {
            method: method.into(),
            path: percent_decode(path),
            query,
            headers: HashMap::new(),
            base_path: "/".to_string(),
        }
    }

    /// Creates a GET request.
    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    /// Creates a POST request.
    pub fn post(uri: &str) -> Self {
        Self::new("POST", uri)
    }

    /// Creates a HEAD request.
    pub fn head(uri: &str) -> Self {
        Self::new("HEAD", uri)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the `Host` header.
    #[must_use]
    pub fn host(self, host: impl Into<String>) -> Self {
        self.header("Host", host)
    }

    /// Sets the mount point of the application.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }
}

impl RequestSource for Request {
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn host(&self) -> Option<&str> {
        RequestSource::header(self, "Host")
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }
}

/// Percent-decodes a URI path. `+` is left alone.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let decoded = s
                .get(i + 1..i + 3)
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
