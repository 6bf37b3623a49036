//! Canonical form of a request for AWS Signature Version 4.
//!
//! The canonical request is the exact byte string both sides hash. It has to be
//! independent of header order and casing, of the transport's choice to send a
//! default port, and of the client's own `Content-Length` claim:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! `CanonicalHeaders` already ends with a newline, so a blank line separates it
//! from `SignedHeaders`.

use std::fmt::Write as _;

use http::uri::Authority;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};

use crate::error::AuthError;
use crate::request::RequestParts;

/// Everything except the SigV4 unreserved characters (`A-Z a-z 0-9 - _ . ~`).
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Canonicalizer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeaders {
    /// One `name:value\n` line per signed header, sorted by name.
    pub canonical: String,
    /// The sorted, lower-cased header names joined with `;`.
    pub signed: String,
}

/// Build the canonical header block and signed header list.
///
/// `signed_headers` is the client's `SignedHeaders=` list in any order and
/// casing. `host` is always taken from the request authority with the default
/// port elided, and `content-length` from the transport's body length, never
/// from the client's headers.
///
/// # Examples
///
/// ```
/// use s3verify_auth::canonical::canonical_headers;
/// use s3verify_auth::request::RequestParts;
///
/// let (parts, ()) = http::Request::builder()
///     .uri("http://example.com:80/")
///     .header("X-Amz-Date", "20130524T000000Z")
///     .body(())
///     .unwrap()
///     .into_parts();
/// let headers = canonical_headers(&RequestParts::new(&parts, 0), &["X-Amz-Date", "Host"], "http").unwrap();
/// assert_eq!(headers.canonical, "host:example.com\nx-amz-date:20130524T000000Z\n");
/// assert_eq!(headers.signed, "host;x-amz-date");
/// ```
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] if a signed header is absent from the
/// request or has a value that is not visible ASCII.
pub fn canonical_headers<S: AsRef<str>>(
    request: &RequestParts<'_>,
    signed_headers: &[S],
    default_scheme: &str,
) -> Result<CanonicalHeaders, AuthError> {
    let mut names: Vec<String> = signed_headers
        .iter()
        .map(|name| name.as_ref().trim().to_ascii_lowercase())
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut canonical = String::with_capacity(names.len() * 32);
    for name in &names {
        let value = match name.as_str() {
            "host" => {
                let host = request
                    .host()
                    .ok_or_else(|| AuthError::malformed("signed header host is missing"))?;
                let scheme = request.scheme().unwrap_or(default_scheme);
                elide_default_port(scheme, host)
            }
            "content-length" => request.content_length().to_string(),
            _ => {
                let values = request.header_values(name).ok_or_else(|| {
                    AuthError::malformed(format!("signed header {name} is not valid text"))
                })?;
                if values.is_empty() {
                    return Err(AuthError::malformed(format!(
                        "signed header {name} is missing"
                    )));
                }
                values
                    .iter()
                    .map(|v| trim_header_value(v))
                    .collect::<Vec<_>>()
                    .join(",")
            }
        };
        // Writing to a String cannot fail.
        let _ = writeln!(canonical, "{name}:{value}");
    }

    Ok(CanonicalHeaders {
        canonical,
        signed: names.join(";"),
    })
}

/// Strip the port from `host` when it is the default for `scheme`.
///
/// `http` with port `80` and `https` with port `443` lose their port; any other
/// combination, and anything that does not parse as an authority, is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use s3verify_auth::canonical::elide_default_port;
///
/// assert_eq!(elide_default_port("http", "test.com:80"), "test.com");
/// assert_eq!(elide_default_port("HTTPS", "127.0.0.1:443"), "127.0.0.1");
/// assert_eq!(elide_default_port("http", "test.com:8080"), "test.com:8080");
/// ```
#[must_use]
pub fn elide_default_port(scheme: &str, host: &str) -> String {
    let Ok(authority) = host.parse::<Authority>() else {
        return host.to_owned();
    };
    let Some(port) = authority.port() else {
        return host.to_owned();
    };

    let is_default = (scheme.eq_ignore_ascii_case("http") && port.as_str() == "80")
        || (scheme.eq_ignore_ascii_case("https") && port.as_str() == "443");
    if is_default {
        authority.host().to_owned()
    } else {
        host.to_owned()
    }
}

/// Build the canonical URI by URI-encoding each path segment individually.
///
/// Forward slashes are preserved and an empty path becomes `/`. Segments are
/// decoded before encoding, so an already encoded path is not encoded twice.
/// Dot segments are left as the transport delivered them.
///
/// # Examples
///
/// ```
/// use s3verify_auth::canonical::canonical_uri;
///
/// assert_eq!(canonical_uri("/test.txt"), "/test.txt");
/// assert_eq!(canonical_uri(""), "/");
/// assert_eq!(canonical_uri("/my key"), "/my%20key");
/// ```
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(reencode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical query string.
///
/// Parameters are split on `&` and `=`, decoded to bytes (`+` reads as a
/// space), every name and value is re-encoded with the unreserved set, and pairs are sorted by name and then by
/// value. A parameter without `=` is rendered with an empty value.
///
/// # Examples
///
/// ```
/// use s3verify_auth::canonical::canonical_query_string;
///
/// assert_eq!(canonical_query_string(""), "");
/// assert_eq!(canonical_query_string("b=2&a=1&uploads"), "a=1&b=2&uploads=");
/// ```
#[must_use]
pub fn canonical_query_string(query: &str) -> String {
    let mut params: Vec<(String, String)> = query
        .split('&')
        .filter(|param| !param.is_empty())
        .map(|param| {
            let (k, v) = param.split_once('=').unwrap_or((param, ""));
            (
                reencode(&k.replace('+', "%20")),
                reencode(&v.replace('+', "%20")),
            )
        })
        .collect();
    params.sort_unstable();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Trim a header value and collapse interior runs of spaces to one.
fn trim_header_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut prev_was_space = false;
    for ch in value.trim().chars() {
        if ch == ' ' {
            if !prev_was_space {
                result.push(' ');
            }
            prev_was_space = true;
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}

/// Percent-decode `raw` to bytes and encode them with the SigV4 rules.
///
/// Works on bytes, not text, so escapes that are not valid UTF-8 keep their
/// identity instead of collapsing into a replacement character.
fn reencode(raw: &str) -> String {
    let bytes: Vec<u8> = percent_decode_str(raw).collect();
    percent_encode(&bytes, URI_ENCODE_SET).to_string()
}
