//! SigV4 request verification.
//!
//! The verifier walks one request through a fixed sequence of states:
//!
//! 1. Detect: the `Authorization` header must start with `AWS4-HMAC-SHA256`,
//!    otherwise [`AuthError::NotSigV4`].
//! 2. Parse the header and snapshot the request into [`RequestData`]. Any
//!    structural problem is [`AuthError::Malformed`].
//! 3. Look up the secret for the claimed access key, exactly once. A store
//!    failure is [`AuthError::LookupFailed`]; an unknown key is
//!    [`AuthOutcome::Denied`].
//! 4. Recompute the signature with the resolved secret and compare it to the
//!    claimed one in constant time. A mismatch is [`AuthOutcome::Denied`].
//!
//! Unknown keys and wrong signatures are deliberately indistinguishable to the
//! caller.

use chrono::NaiveDateTime;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::authorization::{ParsedAuthorization, parse_authorization, signature_of};
use crate::config::{SigningScheme, VerifierConfig};
use crate::credentials::{AsyncCredentialProvider, CredentialProvider, Credentials};
use crate::error::{AuthError, LookupError};
use crate::request::RequestParts;
use crate::request_data::{AMZ_DATE_FORMAT, RequestData};
use crate::signer::Signer;

/// Details of a successfully authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// The access key ID that signed the request.
    pub access_key_id: String,
    /// The region from the credential scope.
    pub region: String,
    /// The service the signature was checked against.
    pub service: String,
    /// The signed header names as the client listed them.
    pub signed_headers: Vec<String>,
}

/// Result of verifying a well-formed SigV4 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The signature matches.
    Authenticated(AuthContext),
    /// Unknown access key or signature mismatch.
    Denied,
}

impl AuthOutcome {
    /// Whether the request was authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The authenticated access key, if any.
    #[must_use]
    pub fn access_key_id(&self) -> Option<&str> {
        match self {
            Self::Authenticated(ctx) => Some(&ctx.access_key_id),
            Self::Denied => None,
        }
    }
}

/// Whether `request` claims to be signed with AWS4-HMAC-SHA256.
#[must_use]
pub fn is_sigv4(request: &RequestParts<'_>) -> bool {
    request
        .header(http::header::AUTHORIZATION.as_str())
        .is_some_and(|v| v.starts_with(SigningScheme::AWS4_HMAC_SHA256.algorithm))
}

/// Verify `request` with the default [`VerifierConfig`].
///
/// # Errors
///
/// See [`Verifier::verify`].
pub fn verify_sigv4(
    request: &RequestParts<'_>,
    credential_provider: &dyn CredentialProvider,
) -> Result<AuthOutcome, AuthError> {
    Verifier::default().verify(request, credential_provider)
}

/// Stateless SigV4 verifier. Cheap to share between threads.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

/// A parsed request waiting for its secret.
struct Pending {
    parsed: ParsedAuthorization,
    data: RequestData,
}

impl Verifier {
    /// Create a verifier with the given configuration.
    #[must_use]
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `request`, resolving the secret through `credential_provider`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotSigV4`] if the request is not SigV4 signed.
    /// - [`AuthError::Malformed`] if the `Authorization` header or a signed
    ///   header is invalid.
    /// - [`AuthError::LookupFailed`] if the credential store fails.
    pub fn verify(
        &self,
        request: &RequestParts<'_>,
        credential_provider: &dyn CredentialProvider,
    ) -> Result<AuthOutcome, AuthError> {
        let pending = self.prepare(request)?;
        let secret = credential_provider.lookup_secret(&pending.parsed.access_key);
        Self::complete(pending, secret)
    }

    /// Like [`Verifier::verify`], for credential stores that must be awaited.
    ///
    /// The store is awaited once, with no retry or timeout of its own.
    ///
    /// # Errors
    ///
    /// See [`Verifier::verify`].
    pub async fn verify_async(
        &self,
        request: &RequestParts<'_>,
        credential_provider: &dyn AsyncCredentialProvider,
    ) -> Result<AuthOutcome, AuthError> {
        let pending = self.prepare(request)?;
        let secret = credential_provider
            .resolve_secret(&pending.parsed.access_key)
            .await;
        Self::complete(pending, secret)
    }

    /// Detect, parse and snapshot. Nothing here depends on the secret.
    fn prepare(&self, request: &RequestParts<'_>) -> Result<Pending, AuthError> {
        if !is_sigv4(request) {
            return Err(AuthError::NotSigV4);
        }

        let parsed = parse_authorization(request)?.ok_or(AuthError::NotSigV4)?;
        debug!(
            access_key_id = %parsed.access_key,
            scope_date = %parsed.scope_date,
            region = %parsed.region,
            service = %parsed.service,
            "Parsed SigV4 authorization header"
        );

        if self.config.strict_scope_date {
            check_scope_date(&parsed)?;
        }

        let data = RequestData::from_request(
            request,
            &self.config.service,
            &parsed.region,
            &parsed.signed_headers,
            &self.config.default_scheme,
        )?;

        Ok(Pending { parsed, data })
    }

    /// Resolve the lookup result, recompute and compare.
    fn complete(
        pending: Pending,
        secret: Result<Option<String>, LookupError>,
    ) -> Result<AuthOutcome, AuthError> {
        let Pending { parsed, data } = pending;

        let secret = match secret {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                debug!(access_key_id = %parsed.access_key, "Access key not found");
                return Ok(AuthOutcome::Denied);
            }
            Err(err) => {
                warn!(access_key_id = %parsed.access_key, error = %err, "Credential lookup failed");
                return Err(AuthError::lookup_failed(&parsed.access_key, err));
            }
        };

        let credentials = Credentials::new(parsed.access_key, secret);
        let computation = Signer::new(&credentials, &data).sign();
        debug!(
            canonical_request = %computation.canonical_request,
            string_to_sign = %computation.string_to_sign,
            "Recomputed SigV4 signature"
        );

        let expected = signature_of(&computation.authorization_header).ok_or_else(|| {
            AuthError::malformed("recomputed authorization header carries no signature")
        })?;

        if bool::from(parsed.signature.as_bytes().ct_eq(expected.as_bytes())) {
            debug!(access_key_id = %credentials.access_key_id, "Signature verification succeeded");
            Ok(AuthOutcome::Authenticated(AuthContext {
                access_key_id: credentials.access_key_id,
                region: parsed.region,
                service: data.service,
                signed_headers: parsed.signed_headers,
            }))
        } else {
            debug!(
                expected = %expected,
                provided = %parsed.signature,
                "Signature mismatch"
            );
            Ok(AuthOutcome::Denied)
        }
    }
}

/// The credential scope date must be the date portion of a valid `X-Amz-Date`.
fn check_scope_date(parsed: &ParsedAuthorization) -> Result<(), AuthError> {
    NaiveDateTime::parse_from_str(&parsed.timestamp, AMZ_DATE_FORMAT).map_err(|_| {
        AuthError::malformed(format!("invalid X-Amz-Date: {:?}", parsed.timestamp))
    })?;

    if parsed.scope_date != parsed.date() {
        return Err(AuthError::malformed(format!(
            "credential scope date {} does not match X-Amz-Date {}",
            parsed.scope_date, parsed.timestamp
        )));
    }

    Ok(())
}
