//! The three failure classes stay distinct.

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use s3verify_auth::{AuthErrorKind, AuthOutcome, StaticCredentialProvider, verify_sigv4};

    use crate::{TestRequest, credential_provider};

    #[test]
    fn test_should_reject_anonymous_request_as_not_applicable() {
        let req = TestRequest::new("GET", "http://test.com", "hackmd", "abcd", b"");

        let err = verify_sigv4(&req.view(), &credential_provider()).expect_err("no auth header");
        assert_eq!(err.kind(), AuthErrorKind::NotSigV4);
    }

    #[test]
    fn test_should_return_malformed_error_for_two_part_header() {
        let mut req = TestRequest::new("GET", "http://test.com", "hackmd", "abcd", b"");
        req.parts.headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static(
                "AWS4-HMAC-SHA256 Credential=abc/20230615/us-east-1/s3/aws4_request, \
                 SignedHeaders=host;x-amz-date",
            ),
        );

        let err = verify_sigv4(&req.view(), &credential_provider()).expect_err("malformed");
        assert_eq!(err.kind(), AuthErrorKind::Malformed);
    }

    #[test]
    fn test_should_deny_unknown_key_without_error() {
        let req = TestRequest::new("GET", "http://test.com", "hackmd", "abcd", b"").signed();

        let empty = StaticCredentialProvider::default();
        let outcome = verify_sigv4(&req.view(), &empty).expect("not an error");
        assert_eq!(outcome, AuthOutcome::Denied);
    }

    #[test]
    fn test_should_surface_store_failure() {
        let req = TestRequest::new("GET", "http://test.com", "hackmd", "abcd", b"").signed();
        let failing = |_: &str| -> Result<Option<String>, std::io::Error> {
            Err(std::io::Error::other("connection refused"))
        };

        let err = verify_sigv4(&req.view(), &failing).expect_err("lookup failure");
        assert_eq!(err.kind(), AuthErrorKind::LookupFailed);
    }
}
