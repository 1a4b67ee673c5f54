use chrono::Utc;
use rand::Rng;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub const ORDER_ID_PREFIX: &str = "ORD";
pub const ORDER_ID_MIN_LEN: usize = 5;
pub const ORDER_ID_MAX_LEN: usize = 30;
const ORDER_ID_RANDOM_LEN: usize = 8;

/// Merchant-side identifiers. Every call draws from the thread-local RNG
/// and the wall clock only, so concurrent callers never share state.
pub struct IdGenerator;

impl IdGenerator {
    /// `ORD_<unixMillis>_<8 base36 chars>`, cut to 30 characters.
    pub fn order_id() -> String {
        Self::order_id_with_prefix(ORDER_ID_PREFIX)
    }

    pub fn order_id_with_prefix(prefix: &str) -> String {
        let mut rng = rand::thread_rng();
        let suffix = random_from(&mut rng, BASE36, ORDER_ID_RANDOM_LEN);
        let mut id = format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix);

        if id.chars().count() > ORDER_ID_MAX_LEN {
            id = id.chars().take(ORDER_ID_MAX_LEN).collect();
        }
        id
    }

    /// Three uppercase letters followed by five digits, e.g. `ARP10234`.
    pub fn customer_reference() -> String {
        CustomerReferenceFormat::default().generate()
    }

    /// `receipt_<unixMillis>`, the default Razorpay receipt.
    pub fn receipt() -> String {
        format!("receipt_{}", Utc::now().timestamp_millis())
    }
}

/// Shape of a customer reference number. Shorter shapes are padded with
/// trailing digits of the current timestamp up to `min_len`.
#[derive(Debug, Clone, Copy)]
pub struct CustomerReferenceFormat {
    pub letters: usize,
    pub digits: usize,
    pub min_len: usize,
}

impl Default for CustomerReferenceFormat {
    fn default() -> Self {
        Self {
            letters: 3,
            digits: 5,
            min_len: 8,
        }
    }
}

impl CustomerReferenceFormat {
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut reference = random_from(&mut rng, LETTERS, self.letters);
        reference.push_str(&random_from(&mut rng, DIGITS, self.digits));

        if reference.len() < self.min_len {
            let stamp = Utc::now().timestamp_millis().unsigned_abs().to_string();
            let missing = self.min_len - reference.len();
            // a millisecond stamp has 13 digits; repeat it for very short shapes
            let padding: String = stamp.chars().rev().cycle().take(missing).collect();
            reference.push_str(&padding);
        }
        reference
    }
}

fn random_from<R: Rng>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_order_id_shape(id: &str, prefix: &str) {
        assert!(id.len() >= ORDER_ID_MIN_LEN && id.len() <= ORDER_ID_MAX_LEN, "{}", id);

        let mut parts = id.splitn(3, '_');
        assert_eq!(parts.next(), Some(prefix));
        let millis = parts.next().unwrap();
        assert!(!millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()));
        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), ORDER_ID_RANDOM_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_order_id_format() {
        for _ in 0..200 {
            assert_order_id_shape(&IdGenerator::order_id(), ORDER_ID_PREFIX);
        }
    }

    #[test]
    fn test_order_id_truncated_to_max_len() {
        let id = IdGenerator::order_id_with_prefix("MERCHANT_CHECKOUT");
        assert_eq!(id.len(), ORDER_ID_MAX_LEN);
        assert!(id.starts_with("MERCHANT_CHECKOUT_"));
    }

    #[test]
    fn test_order_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| IdGenerator::order_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_order_ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| IdGenerator::order_id()).collect::<Vec<_>>()))
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id));
            }
        }
    }

    #[test]
    fn test_customer_reference_format() {
        for _ in 0..200 {
            let reference = IdGenerator::customer_reference();
            assert_eq!(reference.len(), 8);
            assert!(reference[..3].chars().all(|c| c.is_ascii_uppercase()));
            assert!(reference[3..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_short_customer_reference_is_padded() {
        let format = CustomerReferenceFormat {
            letters: 3,
            digits: 2,
            min_len: 8,
        };
        let reference = format.generate();
        assert_eq!(reference.len(), 8);
        assert!(reference[..3].chars().all(|c| c.is_ascii_uppercase()));
        assert!(reference[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_receipt_format() {
        let receipt = IdGenerator::receipt();
        let millis = receipt.strip_prefix("receipt_").unwrap();
        assert!(millis.parse::<i64>().is_ok());
    }
}
