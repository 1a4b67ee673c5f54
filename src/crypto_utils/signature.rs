use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 shared by the BillDesk checksum and the Razorpay
/// signature check.
pub struct HmacSignature;

impl HmacSignature {
    fn keyed(secret: &[u8]) -> AppResult<HmacSha256> {
        // An empty key would still produce a digest; refuse it instead.
        if secret.is_empty() {
            return Err(AppError::Config("HMAC secret key is not configured".to_string()));
        }

        HmacSha256::new_from_slice(secret)
            .map_err(|e| AppError::Internal(format!("HMAC initialization failed: {}", e)))
    }

    /// Generate HMAC-SHA256 signature
    pub fn sign(message: &[u8], secret: &[u8]) -> AppResult<Vec<u8>> {
        let mut mac = Self::keyed(secret)?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Lowercase hex, the form Razorpay sends back from checkout.
    pub fn sign_hex(message: &[u8], secret: &[u8]) -> AppResult<String> {
        Ok(hex::encode(Self::sign(message, secret)?))
    }

    /// Uppercase hex, the form BillDesk expects in the checksum field.
    pub fn sign_hex_upper(message: &[u8], secret: &[u8]) -> AppResult<String> {
        Ok(hex::encode_upper(Self::sign(message, secret)?))
    }

    /// Verify HMAC-SHA256 signature in constant time
    pub fn verify(message: &[u8], signature: &[u8], secret: &[u8]) -> AppResult<bool> {
        let mut mac = Self::keyed(secret)?;
        mac.update(message);
        Ok(mac.verify_slice(signature).is_ok())
    }

    /// Verify a lowercase hex signature. Anything else, including the
    /// same digest in another case or with surrounding whitespace, is a
    /// mismatch.
    pub fn verify_hex(message: &[u8], signature_hex: &str, secret: &[u8]) -> AppResult<bool> {
        Self::verify_canonical_hex(message, signature_hex, secret, HexCase::Lower)
    }

    /// Uppercase counterpart of [`HmacSignature::verify_hex`].
    pub fn verify_hex_upper(message: &[u8], signature_hex: &str, secret: &[u8]) -> AppResult<bool> {
        Self::verify_canonical_hex(message, signature_hex, secret, HexCase::Upper)
    }

    fn verify_canonical_hex(
        message: &[u8],
        signature_hex: &str,
        secret: &[u8],
        case: HexCase,
    ) -> AppResult<bool> {
        let signature = match case.decode(signature_hex) {
            Some(bytes) => bytes,
            None => {
                // still reject a missing key before reporting a mismatch
                Self::keyed(secret)?;
                return Ok(false);
            }
        };

        Self::verify(message, &signature, secret)
    }
}

#[derive(Clone, Copy)]
enum HexCase {
    Lower,
    Upper,
}

impl HexCase {
    fn decode(self, text: &str) -> Option<Vec<u8>> {
        let canonical = text.bytes().all(|b| match self {
            HexCase::Lower => b.is_ascii_digit() || (b'a'..=b'f').contains(&b),
            HexCase::Upper => b.is_ascii_digit() || (b'A'..=b'F').contains(&b),
        });
        if !canonical {
            return None;
        }
        hex::decode(text).ok()
    }
}
