//! The four SigV4 tasks.
//!
//! 1. Canonical request from [`RequestData`].
//! 2. String to sign from the timestamp, credential scope and canonical request hash.
//! 3. Signing key from the secret through a five-step HMAC-SHA256 chain, then
//!    the signature over the string to sign.
//! 4. The `Authorization` header value.
//!
//! Each task is a pure function of the previous task's output, so running the
//! signer twice on the same inputs yields byte-identical results.

use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};

use crate::config::{SigningScheme, VerifierConfig};
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::request::RequestParts;
use crate::request_data::RequestData;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: SigningScheme = SigningScheme::AWS4_HMAC_SHA256;

/// The intermediate artifacts of one signature computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureComputation {
    /// Task 1 output.
    pub canonical_request: String,
    /// Task 2 output.
    pub string_to_sign: String,
    /// Task 3 output, hex encoded.
    pub signature: String,
    /// Task 4 output, the full `Authorization` header value.
    pub authorization_header: String,
}

/// Signs one [`RequestData`] snapshot with one credential pair.
#[derive(Debug)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
    data: &'a RequestData,
}

impl<'a> Signer<'a> {
    /// Create a signer for `data` using `credentials`.
    #[must_use]
    pub fn new(credentials: &'a Credentials, data: &'a RequestData) -> Self {
        Self { credentials, data }
    }

    /// Run all four tasks.
    #[must_use]
    pub fn sign(&self) -> SignatureComputation {
        let canonical_request = self.canonical_request();
        let string_to_sign = self.string_to_sign(&canonical_request);
        let signature = self.signature(&string_to_sign);
        let authorization_header = self.authorization_header(&signature);

        SignatureComputation {
            canonical_request,
            string_to_sign,
            signature,
            authorization_header,
        }
    }

    /// Task 1: the six newline-separated canonical request lines.
    #[must_use]
    pub fn canonical_request(&self) -> String {
        let d = self.data;
        [
            d.method.as_str(),
            d.url_path.as_str(),
            d.url_query.as_str(),
            d.canonical_headers.as_str(),
            d.signed_headers.as_str(),
            d.body_digest.as_str(),
        ]
        .join("\n")
    }

    /// Task 2: the string to sign.
    #[must_use]
    pub fn string_to_sign(&self, canonical_request: &str) -> String {
        build_string_to_sign(
            &self.data.timestamp,
            &self.data.credential_scope(),
            &hash_payload(canonical_request.as_bytes()),
        )
    }

    /// Task 3: the hex-encoded signature over `string_to_sign`.
    #[must_use]
    pub fn signature(&self, string_to_sign: &str) -> String {
        let signing_key = derive_signing_key(
            &self.credentials.secret_access_key,
            &self.data.date,
            &self.data.region,
            &self.data.service,
        );
        compute_signature(&signing_key, string_to_sign)
    }

    /// Task 4: the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self, signature: &str) -> String {
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={signature}",
            SCHEME.algorithm,
            self.credentials.access_key_id,
            self.data.credential_scope(),
            self.data.signed_headers,
        )
    }
}

/// Build the SigV4 string to sign.
///
/// # Examples
///
/// ```
/// use s3verify_auth::signer::build_string_to_sign;
///
/// let sts = build_string_to_sign(
///     "20130524T000000Z",
///     "20130524/us-east-1/s3/aws4_request",
///     "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972",
/// );
/// assert!(sts.starts_with("AWS4-HMAC-SHA256\n20130524T000000Z\n"));
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!(
        "{}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}",
        SCHEME.algorithm
    )
}

/// Derive the SigV4 signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
///
/// Every round keys on the raw bytes of the previous one.
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(
        format!("{}{secret_key}", SCHEME.key_prefix).as_bytes(),
        date.as_bytes(),
    );
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, SCHEME.scope_terminator.as_bytes())
}

/// Compute the hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Compute the SHA-256 hash of `payload` as lowercase hex.
///
/// This is the value clients put in `X-Amz-Content-Sha256`.
///
/// # Examples
///
/// ```
/// use s3verify_auth::signer::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Sign `request` as a client would, over the given header names.
///
/// The returned [`SignatureComputation::authorization_header`] is what goes
/// into the request's `Authorization` header.
///
/// # Errors
///
/// Returns [`AuthError::Malformed`] if one of `signed_headers` is missing from
/// the request.
pub fn sign_request<S: AsRef<str>>(
    request: &RequestParts<'_>,
    credentials: &Credentials,
    region: &str,
    signed_headers: &[S],
    config: &VerifierConfig,
) -> Result<SignatureComputation, AuthError> {
    let data = RequestData::from_request(
        request,
        &config.service,
        region,
        signed_headers,
        &config.default_scheme,
    )?;
    Ok(Signer::new(credentials, &data).sign())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
