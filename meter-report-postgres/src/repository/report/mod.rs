pub mod activity_log_repository;
pub mod connection_report_repository;
pub mod factory;
pub mod yantek_report_repository;
#[cfg(test)]
pub mod test_utils;

pub use activity_log_repository::ActivityLogRepositoryImpl;
pub use connection_report_repository::ConnectionReportRepositoryImpl;
pub use factory::{ReportRepoFactory, ReportRepositories};
pub use yantek_report_repository::YantekReportRepositoryImpl;
