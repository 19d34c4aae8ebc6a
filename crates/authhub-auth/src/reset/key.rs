//! Reset key generation and expiry arithmetic.
//!
//! A reset key is a single-use random token permitting a password change
//! without prior authentication, time-boxed by a configured expiry window.
//! The state machine is: none -> (request) -> pending -> (consume | kill)
//! -> none; a second request simply overwrites the pending key.

use chrono::{DateTime, Duration, Utc};

use crate::random::random_alphanumeric;

/// Length of a password reset key.
pub const RESET_KEY_LEN: usize = 12;

/// Generates a fresh reset key from the full alphanumeric set.
pub fn generate_reset_key() -> String {
    random_alphanumeric(RESET_KEY_LEN)
}

/// Whether a reset key issued at `issued_at` has expired as of `now`.
///
/// The key expires once `now` is strictly past
/// `issued_at + expires_after_hours`.
pub fn is_reset_expired(
    issued_at: DateTime<Utc>,
    now: DateTime<Utc>,
    expires_after_hours: u64,
) -> bool {
    let expires_on = issued_at + Duration::hours(expires_after_hours as i64);
    now > expires_on
}
