//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, loaded from a Bearer
//!   access token. Authorization decisions go through
//!   `knowmaint_core::policy` in the handlers.

pub mod auth;
