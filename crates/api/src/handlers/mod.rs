pub mod articles;
pub mod auth;
pub mod groups;
pub mod info_categories;
pub mod proposals;
pub mod statistics;
pub mod users;
