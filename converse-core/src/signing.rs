// converse-core/src/signing.rs

//! SigV4 signing of a Converse request with resolved AWS credentials.

use crate::errors::{ConverseError, Result};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningParams, SigningSettings, sign};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use std::time::SystemTime;
use url::Url;

/// Where and when a request is signed.
pub struct SigningScope<'a> {
    pub region: &'a str,
    pub service: &'a str,
    pub time: SystemTime,
}

/// Signs a request and returns the headers to attach: `x-amz-date`,
/// `x-amz-security-token` when the credentials carry a session token, and
/// `authorization`. `headers` are covered by the signature; `host` is taken
/// from `url`.
pub fn sign_request(
    credentials: &Credentials,
    scope: &SigningScope<'_>,
    method: &str,
    url: &Url,
    headers: &[(&str, &str)],
    body: &[u8],
) -> Result<Vec<(String, String)>> {
    let identity: Identity = credentials.clone().into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(scope.region)
        .name(scope.service)
        .time(scope.time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| ConverseError::Signing(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        method,
        url.as_str(),
        headers.iter().copied(),
        SignableBody::Bytes(body),
    )
    .map_err(|e| ConverseError::Signing(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| ConverseError::Signing(e.to_string()))?
        .into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    // 2015-08-30T12:36:00Z
    fn vanilla_time() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_440_938_160)
    }

    #[test]
    fn test_get_vanilla_vector() {
        let credentials = Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET, None, None, "test");
        let scope = SigningScope {
            region: "us-east-1",
            service: "service",
            time: vanilla_time(),
        };
        let url = Url::parse("https://example.amazonaws.com/").unwrap();
        let headers = sign_request(&credentials, &scope, "GET", &url, &[], b"").unwrap();

        assert_eq!(header(&headers, "x-amz-date"), Some("20150830T123600Z"));
        assert_eq!(
            header(&headers, "authorization"),
            Some(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
                 SignedHeaders=host;x-amz-date, \
                 Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
            )
        );
    }

    #[test]
    fn test_session_token_is_returned() {
        let credentials =
            Credentials::new("AKID", "secret", Some("session".to_string()), None, "test");
        let scope = SigningScope {
            region: "us-east-1",
            service: "bedrock",
            time: vanilla_time(),
        };
        let url = Url::parse("http://127.0.0.1:8080/model/x/converse").unwrap();
        let headers = sign_request(
            &credentials,
            &scope,
            "POST",
            &url,
            &[("content-type", "application/json")],
            b"{}",
        )
        .unwrap();

        assert_eq!(header(&headers, "x-amz-security-token"), Some("session"));
        let auth = header(&headers, "authorization").unwrap();
        assert!(auth.contains("Credential=AKID/20150830/us-east-1/bedrock/aws4_request"));
        assert!(auth.contains("content-type;host;x-amz-date"), "{}", auth);
    }
}
