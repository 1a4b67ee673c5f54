use crate::crypto_utils::HmacSignature;
use crate::error::{AppError, AppResult};

use super::payload::FIELD_SEPARATOR;

/// Uppercase hex HMAC-SHA256 of `payload`. A missing or empty key is a
/// configuration error; no checksum is produced without one.
pub fn checksum(payload: &str, key: Option<&str>) -> AppResult<String> {
    let key = key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::Config("BillDesk checksum key is not configured".to_string()))?;

    HmacSignature::sign_hex_upper(payload.as_bytes(), key.as_bytes())
}

/// `payload|CHECKSUM`
pub fn append_checksum(payload: &str, key: Option<&str>) -> AppResult<String> {
    let digest = checksum(payload, key)?;
    Ok(format!("{}{}{}", payload, FIELD_SEPARATOR, digest))
}

/// Checks a message whose last field is a checksum over everything before
/// it, such as a gateway response. Comparison is constant time.
pub fn verify_checksum(message: &str, key: Option<&str>) -> AppResult<bool> {
    let key = key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::Config("BillDesk checksum key is not configured".to_string()))?;

    let Some((payload, supplied)) = message.rsplit_once(FIELD_SEPARATOR) else {
        return Ok(false);
    };

    HmacSignature::verify_hex_upper(payload.as_bytes(), supplied, key.as_bytes())
}
