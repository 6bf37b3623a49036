//! Verifier configuration.
//!
//! The algorithm literals are fixed by AWS and live in [`SigningScheme`]. The
//! tunable parts live in [`VerifierConfig`], which is driven by environment
//! variables in the same way as the rest of the server configuration.

/// The constant strings that make up the AWS4-HMAC-SHA256 scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningScheme {
    /// Algorithm name, used in the `Authorization` header and string to sign.
    pub algorithm: &'static str,
    /// Prefix prepended to the secret key before the first HMAC round.
    pub key_prefix: &'static str,
    /// Final component of every credential scope.
    pub scope_terminator: &'static str,
}

impl SigningScheme {
    /// AWS Signature Version 4 with HMAC-SHA256.
    pub const AWS4_HMAC_SHA256: Self = Self {
        algorithm: "AWS4-HMAC-SHA256",
        key_prefix: "AWS4",
        scope_terminator: "aws4_request",
    };
}

/// Configuration for [`Verifier`](crate::verify::Verifier).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifierConfig {
    /// Service name used when recomputing the signature.
    pub service: String,
    /// Require the credential scope date to match `X-Amz-Date`.
    pub strict_scope_date: bool,
    /// Scheme assumed for host port elision when the request URI has none.
    pub default_scheme: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            service: "s3".to_owned(),
            strict_scope_date: true,
            default_scheme: "http".to_owned(),
        }
    }
}

impl VerifierConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SIGV4_SERVICE` | `s3` |
    /// | `SIGV4_STRICT_SCOPE_DATE` | `true` |
    /// | `SIGV4_DEFAULT_SCHEME` | `http` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SIGV4_SERVICE") {
            config.service = v;
        }
        if let Ok(v) = std::env::var("SIGV4_STRICT_SCOPE_DATE") {
            config.strict_scope_date = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("SIGV4_DEFAULT_SCHEME") {
            config.default_scheme = v;
        }

        config
    }
}
