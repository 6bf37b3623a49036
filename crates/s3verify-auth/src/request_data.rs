//! The per-attempt snapshot of everything the signer needs.

use chrono::{DateTime, Utc};

use crate::canonical::{canonical_headers, canonical_query_string, canonical_uri};
use crate::config::SigningScheme;
use crate::error::AuthError;
use crate::request::RequestParts;

/// Header carrying the ISO-8601 basic request timestamp.
pub const X_AMZ_DATE: &str = "x-amz-date";
/// Header carrying the hex SHA-256 digest of the body.
pub const X_AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";

/// Format of the `X-Amz-Date` header.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// An immutable, normalized view of one request, ready to be signed.
///
/// Built fresh for every signature computation and never cached, so it always
/// reflects the exact request under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    /// Service name for the credential scope (e.g. `s3`).
    pub service: String,
    /// Region for the credential scope.
    pub region: String,
    /// HTTP method.
    pub method: String,
    /// Canonical URI.
    pub url_path: String,
    /// Canonical query string.
    pub url_query: String,
    /// Payload digest, taken verbatim from `X-Amz-Content-Sha256`.
    pub body_digest: String,
    /// Full `X-Amz-Date` timestamp.
    pub timestamp: String,
    /// Calendar date portion of `timestamp` (`YYYYMMDD`).
    pub date: String,
    /// Canonical header block, one line per signed header.
    pub canonical_headers: String,
    /// Sorted `;`-joined signed header names.
    pub signed_headers: String,
}

impl RequestData {
    /// Extract the signing inputs from `request`.
    ///
    /// The body digest comes from the `X-Amz-Content-Sha256` header and is not
    /// recomputed. A missing timestamp or digest yields empty fields, which in
    /// turn yield a signature nobody can match.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Malformed`] if a signed header is missing from the
    /// request (see [`canonical_headers`]).
    pub fn from_request<S: AsRef<str>>(
        request: &RequestParts<'_>,
        service: &str,
        region: &str,
        signed_headers: &[S],
        default_scheme: &str,
    ) -> Result<Self, AuthError> {
        let timestamp = request.header(X_AMZ_DATE).unwrap_or_default().to_owned();
        let body_digest = request
            .header(X_AMZ_CONTENT_SHA256)
            .unwrap_or_default()
            .to_owned();
        let headers = canonical_headers(request, signed_headers, default_scheme)?;

        Ok(Self {
            service: service.to_owned(),
            region: region.to_owned(),
            method: request.method().to_owned(),
            url_path: canonical_uri(request.path()),
            url_query: canonical_query_string(request.query()),
            body_digest,
            date: timestamp_date(&timestamp).to_owned(),
            timestamp,
            canonical_headers: headers.canonical,
            signed_headers: headers.signed,
        })
    }

    /// The credential scope, `date/region/service/aws4_request`.
    #[must_use]
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date,
            self.region,
            self.service,
            SigningScheme::AWS4_HMAC_SHA256.scope_terminator
        )
    }
}

/// The `YYYYMMDD` prefix of an `X-Amz-Date` timestamp.
///
/// A timestamp shorter than eight bytes is returned whole.
#[must_use]
pub fn timestamp_date(timestamp: &str) -> &str {
    timestamp.get(..8).unwrap_or(timestamp)
}

/// Format `time` as an `X-Amz-Date` value, e.g. `20230615T120000Z`.
#[must_use]
pub fn format_amz_date(time: DateTime<Utc>) -> String {
    time.format(AMZ_DATE_FORMAT).to_string()
}
