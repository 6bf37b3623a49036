//! Error types for SigV4 verification.
//!
//! Verification has three outcome classes that are never conflated:
//!
//! - the request does not use SigV4 at all ([`AuthError::NotSigV4`]),
//! - the `Authorization` header is structurally invalid ([`AuthError::Malformed`]),
//! - the credential store failed ([`AuthError::LookupFailed`]).
//!
//! A request that is well formed but carries the wrong signature, or names an
//! unknown access key, is *not* an error. It is reported as
//! [`AuthOutcome::Denied`](crate::verify::AuthOutcome::Denied).

use std::error::Error as StdError;

/// Boxed error returned by credential stores.
pub type LookupError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur while verifying an AWS Signature Version 4 request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carries no `Authorization` header starting with `AWS4-HMAC-SHA256`.
    #[error("request is not signed with AWS4-HMAC-SHA256")]
    NotSigV4,

    /// The `Authorization` header or a header it depends on could not be parsed.
    #[error("malformed authorization: {0}")]
    Malformed(String),

    /// The credential store returned an error while resolving the access key.
    #[error("credential lookup failed: {message}")]
    LookupFailed {
        /// Human readable description of the failure.
        message: String,
        /// Underlying cause reported by the credential store, if any.
        #[source]
        source: Option<LookupError>,
    },
}

/// The class of an [`AuthError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// See [`AuthError::NotSigV4`].
    NotSigV4,
    /// See [`AuthError::Malformed`].
    Malformed,
    /// See [`AuthError::LookupFailed`].
    LookupFailed,
}

impl AuthError {
    /// Build a [`AuthError::Malformed`] from anything printable.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Wrap a credential store failure.
    pub(crate) fn lookup_failed(access_key_id: &str, source: LookupError) -> Self {
        Self::LookupFailed {
            message: format!("cannot resolve secret for access key {access_key_id}: {source}"),
            source: Some(source),
        }
    }

    /// The class of this error.
    #[must_use]
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::NotSigV4 => AuthErrorKind::NotSigV4,
            Self::Malformed(_) => AuthErrorKind::Malformed,
            Self::LookupFailed { .. } => AuthErrorKind::LookupFailed,
        }
    }
}
