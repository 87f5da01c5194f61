mod admin;
mod profile;
mod user;

pub use admin::Admin;
pub use profile::{DEFAULT_COMMENT, UserProfile};
pub use user::{UnknownStatus, User, UserStatus};
