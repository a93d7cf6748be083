//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- RS256 access/refresh token issuance and validation.
//! - [`revocation`] -- the revoked-`jti` list consulted on every validation.

pub mod jwt;
pub mod password;
pub mod revocation;
