//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod article;
pub mod group;
pub mod info_category;
pub mod proposal;
pub mod proposal_before;
pub mod statistics;
pub mod user;
