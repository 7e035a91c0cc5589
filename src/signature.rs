//! Webhook signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "x-grateful-signature";

/// Verify an inbound webhook body against the shared secret.
///
/// The processor signs the exact raw body bytes with HMAC-SHA256 and sends
/// the hex digest in the signature header. When neither a signature nor a
/// secret is present, verification is skipped so that deployments which have
/// not configured signing yet still receive webhooks. A one-sided pair
/// (signature without secret, or secret without signature) fails closed.
///
/// Empty strings count as absent.
pub fn verify(raw_body: &[u8], provided: Option<&str>, secret: Option<&str>) -> bool {
    let provided = provided.filter(|s| !s.is_empty());
    let secret = secret.filter(|s| !s.is_empty());

    let (signature, secret) = match (provided, secret) {
        (None, None) => return true,
        (Some(signature), Some(secret)) => (signature, secret),
        _ => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(raw_body);
    let expected = hex::encode(mac.finalize().into_bytes());

    // Constant-time comparison. The length check is not constant-time, but
    // signature length is not secret (always 64 hex chars for SHA-256).
    let expected_bytes = expected.as_bytes();
    let provided_bytes = signature.as_bytes();

    if expected_bytes.len() != provided_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(provided_bytes).into()
}
