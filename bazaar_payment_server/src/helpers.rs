use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::ServerError;

/// Base64 HMAC-SHA256 over `data`, as the payment processor computes it for webhook bodies.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data);
    base64::encode(mac.finalize().into_bytes())
}

/// The acting user, as asserted by the fronting session layer in the `X-User-Id` header.
pub fn acting_user(req: &HttpRequest) -> Result<String, ServerError> {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ServerError::MissingActingUser)
}

#[cfg(test)]
mod test {
    use actix_web::test::TestRequest;

    use super::{acting_user, calculate_hmac};

    #[test]
    fn hmac_is_stable_and_key_sensitive() {
        let sig = calculate_hmac("secret", b"hello");
        assert_eq!(sig, calculate_hmac("secret", b"hello"));
        assert_ne!(sig, calculate_hmac("other", b"hello"));
        assert_ne!(sig, calculate_hmac("secret", b"hello!"));
    }

    #[test]
    fn acting_user_comes_from_the_header() {
        let req = TestRequest::default().insert_header(("X-User-Id", "alice")).to_http_request();
        assert_eq!(acting_user(&req).unwrap(), "alice");
        let req = TestRequest::default().to_http_request();
        assert!(acting_user(&req).is_err());
        let req = TestRequest::default().insert_header(("X-User-Id", "  ")).to_http_request();
        assert!(acting_user(&req).is_err());
    }
}
