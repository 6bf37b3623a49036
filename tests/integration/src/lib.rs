//! End-to-end scenarios for `s3verify-auth`.
//!
//! Requests are built the way an S3 client would build them (path-style
//! bucket and key, `X-Amz-Date`, `X-Amz-Content-Sha256`), signed with the
//! crate's own signer and then verified through the public API only.

use std::sync::Once;

use chrono::Utc;
use http::request::Parts;
use s3verify_auth::request_data::format_amz_date;
use s3verify_auth::{
    Credentials, RequestParts, StaticCredentialProvider, VerifierConfig, hash_payload,
    sign_request,
};

static INIT: Once = Once::new();

/// Access key used by the scenarios.
pub const ACCESS_KEY: &str = "abc";
/// Secret key used by the scenarios.
pub const SECRET_KEY: &str = "123456";
/// Region used by the scenarios.
pub const REGION: &str = "us-east-1";

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A credential store holding the scenario key pair.
#[must_use]
pub fn credential_provider() -> StaticCredentialProvider {
    StaticCredentialProvider::new(vec![(ACCESS_KEY.to_owned(), SECRET_KEY.to_owned())])
}

/// A request head together with its body length.
#[derive(Debug)]
pub struct TestRequest {
    /// Request head.
    pub parts: Parts,
    /// Body length as the transport would report it.
    pub content_length: u64,
}

impl TestRequest {
    /// Build an unsigned path-style S3 request for `bucket`/`key` at `endpoint`.
    #[must_use]
    pub fn new(method: &str, endpoint: &str, bucket: &str, key: &str, body: &[u8]) -> Self {
        init_tracing();

        let (parts, ()) = http::Request::builder()
            .method(method)
            .uri(format!("{endpoint}/{bucket}/{key}"))
            .header("x-amz-date", format_amz_date(Utc::now()))
            .header("x-amz-content-sha256", hash_payload(body))
            .body(())
            .expect("valid request")
            .into_parts();

        Self {
            parts,
            content_length: body.len() as u64,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = http::header::HeaderName::from_bytes(name.as_bytes()).expect("valid header name");
        self.parts
            .headers
            .append(name, value.parse().expect("valid header value"));
        self
    }

    /// Sign over `signed_headers` with `credentials` and set `Authorization`.
    #[must_use]
    pub fn sign_with(mut self, credentials: &Credentials, signed_headers: &[&str]) -> Self {
        let computation = sign_request(
            &self.view(),
            credentials,
            REGION,
            signed_headers,
            &VerifierConfig::default(),
        )
        .expect("signable request");

        self.parts.headers.insert(
            http::header::AUTHORIZATION,
            computation
                .authorization_header
                .parse()
                .expect("valid authorization header"),
        );
        self
    }

    /// Sign with the scenario key pair over the usual S3 header set.
    #[must_use]
    pub fn signed(self) -> Self {
        let mut signed_headers = vec!["host", "x-amz-content-sha256", "x-amz-date"];
        if self.content_length > 0 {
            signed_headers.push("content-length");
        }
        self.sign_with(&Credentials::new(ACCESS_KEY, SECRET_KEY), &signed_headers)
    }

    /// The view handed to the verifier.
    #[must_use]
    pub fn view(&self) -> RequestParts<'_> {
        RequestParts::new(&self.parts, self.content_length)
    }
}

mod test_errors;
mod test_host;
