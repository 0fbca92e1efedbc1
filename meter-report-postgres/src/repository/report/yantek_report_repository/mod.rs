pub mod repo_impl;
pub mod create;
pub mod find_by_id;
pub mod find_max_id_in_range;
pub mod update;
pub mod delete;
pub mod find_page;
pub mod count_created_between;

pub use repo_impl::YantekReportRepositoryImpl;
