use rand::TryRngCore;
use rand::distr::{Alphanumeric, SampleString};
use rand::rngs::OsRng;

/// Length of the random part of a generated user id (`user_` + suffix).
pub const USER_ID_SUFFIX_LEN: usize = 12;
/// Length of the random part of a session token (identity id + suffix).
pub const SESSION_TOKEN_LEN: usize = 32;

/// Shortest accepted id suffix. Shorter ones collide within a few thousand users.
pub const MIN_USER_ID_SUFFIX_LEN: usize = 8;
/// Shortest accepted session suffix. The id part of a token is public.
pub const MIN_SESSION_TOKEN_LEN: usize = 16;

pub const USER_ID_PREFIX: &str = "user_";

/// Returns `length` characters drawn uniformly from `[A-Za-z0-9]`.
///
/// Reads straight from the operating system's CSPRNG. If the OS cannot
/// provide entropy this panics instead of falling back to a weaker source.
pub fn generate(length: usize) -> String {
    let mut rng = OsRng.unwrap_err();
    Alphanumeric.sample_string(&mut rng, length)
}

pub fn new_user_id(suffix_len: usize) -> String {
    format!("{}{}", USER_ID_PREFIX, generate(suffix_len))
}

pub fn new_session_token(identity_id: &str, suffix_len: usize) -> String {
    format!("{}{}", identity_id, generate(suffix_len))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generates_exact_length_alphanumerics() {
        for length in [0, 1, 3, 10, 64] {
            let value = generate(length);
            assert_eq!(value.len(), length);
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn draws_do_not_repeat() {
        let draws: HashSet<String> = (0..1000).map(|_| generate(16)).collect();
        assert_eq!(draws.len(), 1000);
    }

    #[test]
    fn covers_the_whole_alphabet() {
        let seen: HashSet<char> = generate(20_000).chars().collect();
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn ids_and_tokens_carry_their_prefix() {
        let id = new_user_id(USER_ID_SUFFIX_LEN);
        assert!(id.starts_with(USER_ID_PREFIX));
        assert_eq!(id.len(), USER_ID_PREFIX.len() + USER_ID_SUFFIX_LEN);

        let token = new_session_token(&id, SESSION_TOKEN_LEN);
        assert!(token.starts_with(&id));
        assert_eq!(token.len(), id.len() + SESSION_TOKEN_LEN);
    }
}
