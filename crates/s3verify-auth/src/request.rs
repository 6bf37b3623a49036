//! A read-only view of an HTTP request for signing and verification.

use http::request::Parts;

/// The parts of an HTTP request that participate in SigV4.
///
/// `content_length` is the body length known to the transport. It is used for
/// the canonical `content-length` line instead of any client supplied header.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    parts: &'a Parts,
    content_length: u64,
    scheme: Option<&'a str>,
}

impl<'a> RequestParts<'a> {
    /// Wrap request head `parts` whose body is `content_length` bytes long.
    #[must_use]
    pub fn new(parts: &'a Parts, content_length: u64) -> Self {
        Self {
            parts,
            content_length,
            scheme: None,
        }
    }

    /// Override the scheme, e.g. when TLS is terminated in front of the server.
    #[must_use]
    pub fn with_scheme(mut self, scheme: &'a str) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &'a str {
        self.parts.method.as_str()
    }

    /// The raw, still percent-encoded request path.
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.parts.uri.path()
    }

    /// The raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &'a str {
        self.parts.uri.query().unwrap_or("")
    }

    /// The scheme: explicit override first, then the request URI.
    #[must_use]
    pub fn scheme(&self) -> Option<&'a str> {
        self.scheme.or_else(|| self.parts.uri.scheme_str())
    }

    /// The request authority (`host[:port]`): URI authority first, then the `Host` header.
    #[must_use]
    pub fn host(&self) -> Option<&'a str> {
        self.parts
            .uri
            .authority()
            .map(http::uri::Authority::as_str)
            .or_else(|| self.header(http::header::HOST.as_str()))
    }

    /// The declared body length.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// The first value of header `name` (case-insensitive), if it is valid text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value of header `name` (case-insensitive), in arrival order.
    ///
    /// Returns `None` if any value is not visible ASCII.
    pub(crate) fn header_values(&self, name: &str) -> Option<Vec<&'a str>> {
        self.parts
            .headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().ok())
            .collect()
    }
}
