pub mod activity_log_repository;
pub mod connection_report_repository;
pub mod error;
pub mod pagination;
pub mod unit_of_work;
pub mod yantek_report_repository;

// Re-exports
pub use activity_log_repository::*;
pub use connection_report_repository::*;
pub use error::*;
pub use pagination::*;
pub use unit_of_work::*;
pub use yantek_report_repository::*;
