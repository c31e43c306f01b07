//! # Gateway notification signatures
//!
//! The gateway signs every HTTP notification with
//!
//! ```text
//!    hex(SHA512(order_id + status_code + gross_amount + server_key))
//! ```
//!
//! where the fields are the exact strings received in the notification body (e.g. `gross_amount` is `"30000.00"`),
//! and `server_key` is the merchant's server key. Nothing in a notification is trusted until this matches.
use sha2::{Digest, Sha512};

pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compares the supplied signature with the expected one without short-circuiting on the first differing byte.
pub fn verify_notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
    signature: &str,
) -> bool {
    let expected = notification_signature(order_id, status_code, gross_amount, server_key);
    let supplied = signature.trim().to_ascii_lowercase();
    if expected.len() != supplied.len() {
        return false;
    }
    expected.bytes().zip(supplied.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
