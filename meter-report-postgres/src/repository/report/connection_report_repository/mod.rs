pub mod repo_impl;
pub mod create;
pub mod find_by_yantek_report_ids;
pub mod find_max_id_in_range;
pub mod delete_by_yantek_report_id;
pub mod find_page;

pub use repo_impl::ConnectionReportRepositoryImpl;
