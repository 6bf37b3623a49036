//! Host header normalization.

#[cfg(test)]
mod tests {
    use s3verify_auth::canonical::canonical_headers;
    use s3verify_auth::{RequestParts, verify_sigv4};

    use crate::{ACCESS_KEY, TestRequest, credential_provider};

    fn host_line(endpoint: &str) -> String {
        let req = TestRequest::new("GET", endpoint, "hackmd", "abcd", b"");
        canonical_headers(&req.view(), &["host"], "http")
            .expect("host is always available")
            .canonical
    }

    #[test]
    fn test_should_elide_default_http_port() {
        assert_eq!(host_line("http://test.com:80"), host_line("http://test.com"));
        assert_eq!(host_line("http://test.com:80"), "host:test.com\n");
    }

    #[test]
    fn test_should_elide_default_https_port() {
        assert_eq!(
            host_line("https://127.0.0.1:443"),
            host_line("https://127.0.0.1")
        );
    }

    #[test]
    fn test_should_keep_non_default_port() {
        assert_eq!(host_line("http://test.com:8080"), "host:test.com:8080\n");
        assert_eq!(host_line("https://test.com:80"), "host:test.com:80\n");
    }

    #[test]
    fn test_should_verify_origin_form_request_behind_tls_terminator() {
        // Client signs against https://test.com:443, server sees an origin-form target.
        let signed = TestRequest::new("GET", "https://test.com:443", "hackmd", "abcd", b"").signed();

        let (mut parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/hackmd/abcd")
            .header("host", "test.com:443")
            .body(())
            .expect("valid request")
            .into_parts();
        parts.headers.extend(
            signed
                .parts
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let plain = RequestParts::new(&parts, 0);
        let outcome = verify_sigv4(&plain, &credential_provider()).expect("verify");
        assert!(!outcome.is_authenticated());

        let tls = RequestParts::new(&parts, 0).with_scheme("https");
        let outcome = verify_sigv4(&tls, &credential_provider()).expect("verify");
        assert_eq!(outcome.access_key_id(), Some(ACCESS_KEY));
    }
}
