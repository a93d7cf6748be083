//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod article_repo;
pub mod group_repo;
pub mod info_category_repo;
pub mod proposal_before_repo;
pub mod proposal_repo;
pub mod statistics_repo;
pub mod user_repo;

pub use article_repo::ArticleRepo;
pub use group_repo::GroupRepo;
pub use info_category_repo::InfoCategoryRepo;
pub use proposal_before_repo::ProposalBeforeRepo;
pub use proposal_repo::ProposalRepo;
pub use statistics_repo::StatisticsRepo;
pub use user_repo::UserRepo;
