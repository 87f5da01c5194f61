use std::env;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::auth::token::{
    MIN_SESSION_TOKEN_LEN, MIN_USER_ID_SUFFIX_LEN, SESSION_TOKEN_LEN, USER_ID_SUFFIX_LEN,
};

/// Source of the timestamps written to `created_at` / `updated_at`.
pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Postgres URL. Without one the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bcrypt_cost: u32,
    pub session_token_len: usize,
    pub user_id_suffix_len: usize,
    pub admin_id: Option<String>,
    pub admin_password: Option<String>,
    pub clock: Clock,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 1001,
            database_url: None,
            database_max_connections: 10,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            session_token_len: SESSION_TOKEN_LEN,
            user_id_suffix_len: USER_ID_SUFFIX_LEN,
            admin_id: None,
            admin_password: None,
            clock: Utc::now,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let bcrypt_cost = parse_or(&var, "BCRYPT_COST", defaults.bcrypt_cost)?;
        check_range("BCRYPT_COST", bcrypt_cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST)?;

        // short suffixes make tokens guessable from the public user id
        let session_token_len = parse_or(&var, "SESSION_TOKEN_LEN", defaults.session_token_len)?;
        check_range("SESSION_TOKEN_LEN", session_token_len, MIN_SESSION_TOKEN_LEN, usize::MAX)?;

        let user_id_suffix_len =
            parse_or(&var, "USER_ID_SUFFIX_LEN", defaults.user_id_suffix_len)?;
        check_range("USER_ID_SUFFIX_LEN", user_id_suffix_len, MIN_USER_ID_SUFFIX_LEN, usize::MAX)?;

        Ok(Config {
            server_host: var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(&var, "SERVER_PORT", defaults.server_port)?,
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_or(
                &var,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            bcrypt_cost,
            session_token_len,
            user_id_suffix_len,
            admin_id: var("ADMIN_ID"),
            admin_password: var("ADMIN_PASSWORD"),
            clock: defaults.clock,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with the cheapest bcrypt cost, so tests do not spend seconds hashing.
    pub(crate) fn for_tests() -> Self {
        Self {
            bcrypt_cost: MIN_BCRYPT_COST,
            ..Self::default()
        }
    }
}

impl Config {
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

fn check_range<T>(key: &'static str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + ToString,
{
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server_port, 1001);
        assert_eq!(config.session_token_len, SESSION_TOKEN_LEN);
        assert_eq!(config.user_id_suffix_len, USER_ID_SUFFIX_LEN);
        assert!(config.database_url.is_none());
        assert!(config.admin_id.is_none());
    }

    #[test]
    fn values_are_read_and_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/chat"),
            ("BCRYPT_COST", "6"),
            ("ADMIN_ID", "root"),
            ("ADMIN_PASSWORD", ""),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/chat"));
        assert_eq!(config.bcrypt_cost, 6);
        assert_eq!(config.admin_id.as_deref(), Some("root"));
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("SERVER_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));
    }

    #[test]
    fn short_token_and_id_lengths_are_rejected() {
        for (key, value) in [
            ("SESSION_TOKEN_LEN", "0"),
            ("SESSION_TOKEN_LEN", "15"),
            ("USER_ID_SUFFIX_LEN", "0"),
            ("USER_ID_SUFFIX_LEN", "7"),
        ] {
            let err = Config::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn lengths_at_the_floor_are_accepted() {
        let config = Config::from_lookup(lookup(&[
            ("SESSION_TOKEN_LEN", "16"),
            ("USER_ID_SUFFIX_LEN", "8"),
        ]))
        .unwrap();
        assert_eq!(config.session_token_len, MIN_SESSION_TOKEN_LEN);
        assert_eq!(config.user_id_suffix_len, MIN_USER_ID_SUFFIX_LEN);
    }

    #[test]
    fn bcrypt_cost_outside_bcrypt_range_is_rejected() {
        for value in ["3", "32"] {
            let err = Config::from_lookup(lookup(&[("BCRYPT_COST", value)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));
        }
    }
}
