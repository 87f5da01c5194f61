//! Credential checks and session issuance.
//!
//! The flow is: [`verifier`] decides whether the presented credentials match
//! a stored identity, [`issuer`] mints and persists a session token for it,
//! and [`profile`] re-validates that token before mutating user data.

pub mod issuer;
pub mod password;
pub mod profile;
pub mod token;
pub mod verifier;
