use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Offline,
    Banned,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Online => "online",
            UserStatus::Offline => "offline",
            UserStatus::Banned => "banned",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown user status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for UserStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(UserStatus::Online),
            "offline" => Ok(UserStatus::Offline),
            "banned" => Ok(UserStatus::Banned),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for UserStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Login key, unique across users.
    pub address: String,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    pub chat_number: i32,
    /// Current session token. `None` until the first login.
    pub token: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: String,
        name: String,
        address: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            address,
            status: UserStatus::Online,
            chat_number: 0,
            token: None,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
