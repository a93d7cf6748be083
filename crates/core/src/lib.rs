//! Domain logic for the knowledge maintenance service.
//!
//! Everything in this crate is pure: no queries, no async, no I/O. The
//! `db` and `api` crates call into it for role checks, lifecycle guards,
//! visibility scoping and statistics arithmetic.

pub mod error;
pub mod policy;
pub mod proposal;
pub mod roles;
pub mod statistics;
pub mod types;
pub mod validation;
pub mod visibility;
