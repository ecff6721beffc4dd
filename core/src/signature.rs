//! Payment callback signature verification.
//!
//! The gateway proves a callback is authentic by signing
//! `"{order_id}|{payment_id}"` with HMAC-SHA256 under the shared key
//! secret and hex-encoding the result. This check is the single gate
//! controlling the pending → completed ticket transition; the comparison
//! is constant-time.

use crate::error::{CheckoutError, Result};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the expected hex-encoded signature for an order/payment pair.
///
/// # Errors
///
/// Returns [`CheckoutError::Validation`] if the secret cannot be used as an
/// HMAC key (HMAC-SHA256 accepts keys of any length, so this is
/// effectively unreachable).
pub fn expected_signature(order_id: &str, payment_id: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| CheckoutError::Validation("invalid signing secret".into()))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a gateway-supplied signature.
///
/// Returns `true` iff `signature` equals
/// `hex(HMAC_SHA256(secret, "{order_id}|{payment_id}"))` byte-for-byte.
/// Any mismatch in characters, case, or encoding yields `false`.
#[must_use]
pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    expected_signature(order_id, payment_id, secret)
        .map(|expected| constant_time_eq(expected.as_bytes(), signature.as_bytes()))
        .unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "test_key_secret";

    #[test]
    fn matches_reference_vector() {
        // hex(HMAC_SHA256("secret", "order_1|pay_1")), computed with the
        // same construction the gateway documents.
        let sig = expected_signature("order_1", "pay_1", "secret").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify("order_1", "pay_1", &sig, "secret"));
    }

    #[test]
    fn payload_is_order_pipe_payment() {
        // Signing the concatenated string directly must agree with the
        // incremental update calls.
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(b"order_9|pay_9");
        let direct = hex::encode(mac.finalize().into_bytes());
        assert_eq!(expected_signature("order_9", "pay_9", SECRET).unwrap(), direct);
    }

    #[test]
    fn any_single_character_mutation_fails() {
        let sig = expected_signature("order_2", "pay_2", SECRET).unwrap();
        for i in 0..sig.len() {
            let mut bytes = sig.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(
                !verify("order_2", "pay_2", &mutated, SECRET),
                "mutation at {i} should fail"
            );
        }
    }

    #[test]
    fn case_mismatch_fails() {
        let sig = expected_signature("order_3", "pay_3", SECRET).unwrap();
        assert!(verify("order_3", "pay_3", &sig, SECRET));
        assert!(!verify("order_3", "pay_3", &sig.to_uppercase(), SECRET));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = expected_signature("order_4", "pay_4", SECRET).unwrap();
        assert!(!verify("order_4", "pay_4", &sig, "other_secret"));
    }

    #[test]
    fn swapped_ids_fail() {
        let sig = expected_signature("order_5", "pay_5", SECRET).unwrap();
        assert!(!verify("pay_5", "order_5", &sig, SECRET));
    }

    #[test]
    fn empty_signature_fails() {
        assert!(!verify("order_6", "pay_6", "", SECRET));
    }
}
