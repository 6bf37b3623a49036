//! Parsing of the SigV4 `Authorization` header.
//!
//! Format:
//! ```text
//! AWS4-HMAC-SHA256 Credential=AKID/20130524/us-east-1/s3/aws4_request,
//!   SignedHeaders=host;range;x-amz-content-sha256;x-amz-date,
//!   Signature=<hex-signature>
//! ```
//!
//! Nothing parsed here is trusted. The claimed signature in particular is only
//! ever compared against one recomputed from the request.

use crate::config::SigningScheme;
use crate::error::AuthError;
use crate::request::RequestParts;
use crate::request_data::{X_AMZ_CONTENT_SHA256, X_AMZ_DATE, timestamp_date};

const CREDENTIAL_PREFIX: &str = "Credential=";
const SIGNED_HEADERS_PREFIX: &str = "SignedHeaders=";
const SIGNATURE_PREFIX: &str = "Signature=";

/// Structured contents of an `Authorization` header plus the related request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthorization {
    /// The signing algorithm.
    pub algorithm: String,
    /// The access key ID.
    pub access_key: String,
    /// The date field of the credential scope (`YYYYMMDD`).
    pub scope_date: String,
    /// The region field of the credential scope.
    pub region: String,
    /// The service field of the credential scope.
    pub service: String,
    /// The terminator of the credential scope (`aws4_request`).
    pub request_type: String,
    /// Signed header names in the order the client listed them.
    pub signed_headers: Vec<String>,
    /// The claimed hex signature.
    pub signature: String,
    /// The `X-Amz-Date` header.
    pub timestamp: String,
    /// The `Content-Md5` header, passed through.
    pub content_md5: String,
    /// The `X-Amz-Content-Sha256` header.
    pub content_sha256: String,
}

impl ParsedAuthorization {
    /// The date used for key derivation, i.e. the date portion of `X-Amz-Date`.
    ///
    /// This is not cross-checked against [`Self::scope_date`] here; see
    /// [`VerifierConfig::strict_scope_date`](crate::config::VerifierConfig::strict_scope_date).
    #[must_use]
    pub fn date(&self) -> &str {
        timestamp_date(&self.timestamp)
    }
}

/// Parse the `Authorization` header of `request` and collect the related headers.
///
/// Returns `Ok(None)` if the request has no `Authorization` header.
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] if the header is present but malformed.
pub fn parse_authorization(
    request: &RequestParts<'_>,
) -> Result<Option<ParsedAuthorization>, AuthError> {
    let Some(header) = request.header(http::header::AUTHORIZATION.as_str()) else {
        return Ok(None);
    };

    let mut parsed = parse_authorization_header(header)?;
    parsed.timestamp = request.header(X_AMZ_DATE).unwrap_or_default().to_owned();
    parsed.content_md5 = request.header("content-md5").unwrap_or_default().to_owned();
    parsed.content_sha256 = request
        .header(X_AMZ_CONTENT_SHA256)
        .unwrap_or_default()
        .to_owned();

    Ok(Some(parsed))
}

/// Parse a bare `Authorization` header value.
///
/// The header-derived fields (`timestamp`, `content_md5`, `content_sha256`)
/// are left empty.
///
/// # Examples
///
/// ```
/// use s3verify_auth::authorization::parse_authorization_header;
///
/// let parsed = parse_authorization_header(
///     "AWS4-HMAC-SHA256 Credential=abc/20230615/us-east-1/s3/aws4_request, \
///      SignedHeaders=host;x-amz-date, Signature=deadbeef",
/// )
/// .unwrap();
/// assert_eq!(parsed.access_key, "abc");
/// assert_eq!(parsed.signed_headers, ["host", "x-amz-date"]);
/// ```
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] unless the value has exactly three
/// comma-separated parts with the expected prefixes and a five-field
/// credential scope.
pub fn parse_authorization_header(header: &str) -> Result<ParsedAuthorization, AuthError> {
    let parts: Vec<&str> = header.split(',').collect();
    let [credential_part, signed_headers_part, signature_part] = *parts.as_slice() else {
        return Err(AuthError::malformed(format!(
            "expected 3 comma-separated parts, found {}",
            parts.len()
        )));
    };

    let (algorithm, scope) = parse_credential_part(credential_part.trim())?;
    let signed_headers = parse_signed_headers_part(signed_headers_part.trim())?;
    let signature = parse_signature_part(signature_part.trim())?;

    Ok(ParsedAuthorization {
        algorithm: algorithm.to_owned(),
        access_key: scope[0].to_owned(),
        scope_date: scope[1].to_owned(),
        region: scope[2].to_owned(),
        service: scope[3].to_owned(),
        request_type: scope[4].to_owned(),
        signed_headers,
        signature: signature.to_owned(),
        timestamp: String::new(),
        content_md5: String::new(),
        content_sha256: String::new(),
    })
}

/// `<Algorithm> Credential=<AK>/<Date>/<Region>/<Service>/<RequestType>`
fn parse_credential_part(part: &str) -> Result<(&str, [&str; 5]), AuthError> {
    let items: Vec<&str> = part.split(' ').collect();
    let [algorithm, credential] = *items.as_slice() else {
        return Err(AuthError::malformed(format!("invalid credential part: {part}")));
    };

    let algorithm = algorithm.trim();
    let scheme = SigningScheme::AWS4_HMAC_SHA256;
    if algorithm != scheme.algorithm {
        return Err(AuthError::malformed(format!(
            "unsupported algorithm: {algorithm}"
        )));
    }

    let credential = credential
        .trim()
        .strip_prefix(CREDENTIAL_PREFIX)
        .ok_or_else(|| AuthError::malformed(format!("missing {CREDENTIAL_PREFIX} prefix")))?;

    let fields: Vec<&str> = credential.split('/').collect();
    let scope: [&str; 5] = fields.as_slice().try_into().map_err(|_| {
        AuthError::malformed(format!(
            "credential scope needs 5 fields, found {}",
            fields.len()
        ))
    })?;
    if scope[4] != scheme.scope_terminator {
        return Err(AuthError::malformed(format!(
            "credential scope must end with {}",
            scheme.scope_terminator
        )));
    }

    Ok((algorithm, scope))
}

/// `SignedHeaders=<name>;<name>;...`
fn parse_signed_headers_part(part: &str) -> Result<Vec<String>, AuthError> {
    let names = part
        .strip_prefix(SIGNED_HEADERS_PREFIX)
        .ok_or_else(|| AuthError::malformed(format!("missing {SIGNED_HEADERS_PREFIX} prefix")))?;

    Ok(names.split(';').map(|h| h.trim().to_owned()).collect())
}

/// `Signature=<hex>`
fn parse_signature_part(part: &str) -> Result<&str, AuthError> {
    part.strip_prefix(SIGNATURE_PREFIX)
        .map(str::trim)
        .ok_or_else(|| AuthError::malformed(format!("missing {SIGNATURE_PREFIX} prefix")))
}

/// Pull the `Signature=` value out of a complete `Authorization` header value.
pub(crate) fn signature_of(authorization_header: &str) -> Option<&str> {
    let start = authorization_header.rfind(SIGNATURE_PREFIX)? + SIGNATURE_PREFIX.len();
    authorization_header.get(start..)
}
