//! Random token generation for salts, reset keys, and initial passwords.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Generates a random string drawn from the full alphanumeric set.
pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
