use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a gateway callback fails verification. This check is the sole
/// gate before any payment, member, or donation record is marked completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("gateway credentials are not configured")]
    MissingCredentials,
    #[error("order id, payment id, and signature are all required")]
    MissingFields,
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Verifies that a payment-success callback was signed by the gateway.
///
/// The gateway signs `order_id|payment_id` with HMAC-SHA256 under the shared
/// key secret and sends the lowercase hex digest. Pure function: no side
/// effects, so a failed check leaves every record untouched.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<(), VerificationError> {
    if secret.is_empty() {
        return Err(VerificationError::MissingCredentials);
    }
    if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
        return Err(VerificationError::MissingFields);
    }

    let message = format!("{}|{}", order_id, payment_id);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| VerificationError::MissingCredentials)?;
    mac.update(message.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if expected == signature {
        Ok(())
    } else {
        Err(VerificationError::SignatureMismatch)
    }
}

/// Computes the signature the gateway would produce. Exposed for tests and
/// the seed binary's simulated checkout.
pub fn sign_payment(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_key_secret";

    #[test]
    fn accepts_correctly_signed_callback() {
        let sig = sign_payment(SECRET, "order_abc", "pay_xyz");
        assert_eq!(
            verify_payment_signature(SECRET, "order_abc", "pay_xyz", &sig),
            Ok(())
        );
    }

    #[test]
    fn rejects_single_character_mutation() {
        let sig = sign_payment(SECRET, "order_abc", "pay_xyz");
        for i in 0..sig.len() {
            let mut mutated: Vec<char> = sig.chars().collect();
            mutated[i] = if mutated[i] == '0' { '1' } else { '0' };
            let mutated: String = mutated.into_iter().collect();
            if mutated == sig {
                continue;
            }
            assert_eq!(
                verify_payment_signature(SECRET, "order_abc", "pay_xyz", &mutated),
                Err(VerificationError::SignatureMismatch)
            );
        }
    }

    #[test]
    fn rejects_swapped_identifiers() {
        let sig = sign_payment(SECRET, "order_abc", "pay_xyz");
        assert_eq!(
            verify_payment_signature(SECRET, "pay_xyz", "order_abc", &sig),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let sig = sign_payment(SECRET, "order_abc", "pay_xyz");
        assert_eq!(
            verify_payment_signature(SECRET, "", "pay_xyz", &sig),
            Err(VerificationError::MissingFields)
        );
        assert_eq!(
            verify_payment_signature(SECRET, "order_abc", "", &sig),
            Err(VerificationError::MissingFields)
        );
        assert_eq!(
            verify_payment_signature(SECRET, "order_abc", "pay_xyz", ""),
            Err(VerificationError::MissingFields)
        );
    }

    #[test]
    fn rejects_missing_secret() {
        let sig = sign_payment(SECRET, "order_abc", "pay_xyz");
        assert_eq!(
            verify_payment_signature("", "order_abc", "pay_xyz", &sig),
            Err(VerificationError::MissingCredentials)
        );
    }

    #[test]
    fn signature_is_lowercase_hex() {
        let sig = sign_payment(SECRET, "order_abc", "pay_xyz");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
