pub mod activity_log;
pub mod connection_report;
pub mod identifiable;
pub mod report_id;
pub mod yantek_report;

// Re-exports
pub use activity_log::*;
pub use connection_report::*;
pub use identifiable::*;
pub use report_id::*;
pub use yantek_report::*;
