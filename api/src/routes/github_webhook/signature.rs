//! `X-Hub-Signature-256` verification.
//!
//! GitHub signs the raw request body with HMAC-SHA256 keyed by the webhook
//! secret and sends `sha256=<hex digest>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("signature must start with `sha256=`")]
    MalformedPrefix,

    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("signature does not match payload")]
    Mismatch,
}

/// Checks `header` against the HMAC of `payload`; the comparison is
/// constant-time.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(SignatureError::Missing)?;
    let hex_digest = header.strip_prefix(PREFIX).ok_or(SignatureError::MalformedPrefix)?;
    let expected = hex::decode(hex_digest).map_err(|_| SignatureError::InvalidHex)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(payload);
    mac.verify_slice(&expected).map_err(|_| SignatureError::Mismatch)
}

/// `sha256=<hex>` for `payload`, as GitHub would send it.
#[cfg(test)]
pub(crate) fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(payload);
    format!("{PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"action":"opened"}"#;

    #[test]
    fn accepts_valid_signature() {
        let header = sign("s3cret", BODY);
        assert!(header.starts_with("sha256="));
        assert_eq!(verify_signature("s3cret", BODY, Some(&header)), Ok(()));
    }

    #[test]
    fn known_digest() {
        // Example from GitHub's webhook documentation.
        assert_eq!(
            sign("It's a Secret to Everybody", b"Hello, World!"),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn rejects_tampering_and_wrong_secret() {
        let header = sign("s3cret", BODY);
        assert_eq!(
            verify_signature("s3cret", br#"{"action":"closed"}"#, Some(&header)),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature("other", BODY, Some(&header)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(verify_signature("s", BODY, None), Err(SignatureError::Missing));
        assert_eq!(verify_signature("s", BODY, Some("  ")), Err(SignatureError::Missing));

        let bare = sign("s", BODY).trim_start_matches("sha256=").to_string();
        assert_eq!(
            verify_signature("s", BODY, Some(&bare)),
            Err(SignatureError::MalformedPrefix)
        );
        assert_eq!(
            verify_signature("s", BODY, Some("sha256=zzzz")),
            Err(SignatureError::InvalidHex)
        );
    }
}
