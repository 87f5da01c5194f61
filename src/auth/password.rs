use std::sync::OnceLock;

use bcrypt::{hash, verify};

/// Lowest cost bcrypt accepts. Only sensible for tests.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// Runs one verification against a throwaway hash and discards the result.
///
/// Called when no stored identity matched, so an unknown account costs the
/// same bcrypt round as a known one with a wrong password.
pub fn verify_against_dummy(password: &str, cost: u32) {
    let hash = DUMMY_HASH.get_or_init(|| hash_password("dummy-password", cost).unwrap_or_default());
    let _ = verify_password(password, hash);
}

#[cfg(test)]
pub(crate) fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH.get().map(String::as_str)
}
