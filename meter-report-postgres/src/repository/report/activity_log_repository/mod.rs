pub mod repo_impl;
pub mod create;
pub mod find_recent;
pub mod find_by_type_and_actor;

pub use repo_impl::ActivityLogRepositoryImpl;
