use crate::crypto_utils::HmacSignature;
use crate::error::AppResult;

pub struct RazorpaySignature;

impl RazorpaySignature {
    /// signature = HMAC-SHA256(order_id + "|" + payment_id, key_secret)
    pub fn sign_payment(order_id: &str, payment_id: &str, secret: &str) -> AppResult<String> {
        let payload = format!("{}|{}", order_id, payment_id);
        HmacSignature::sign_hex(payload.as_bytes(), secret.as_bytes())
    }

    /// Checkout verification. Comparison is constant time; a mismatch is
    /// `Ok(false)`. An empty secret is an error, never a pass.
    pub fn verify_payment(
        order_id: &str,
        payment_id: &str,
        signature: &str,
        secret: &str,
    ) -> AppResult<bool> {
        let payload = format!("{}|{}", order_id, payment_id);
        HmacSignature::verify_hex(payload.as_bytes(), signature, secret.as_bytes())
    }
}
