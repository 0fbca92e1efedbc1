use std::sync::Arc;

use super::{ActivityLogRepositoryImpl, ConnectionReportRepositoryImpl, YantekReportRepositoryImpl};
use crate::executor::Executor;

/// Factory for creating report module repositories
///
/// This should be used as a singleton throughout the application;
/// every session asks it for repositories bound to its own executor.
#[derive(Default)]
pub struct ReportRepoFactory {
    // No caches needed for the report module
}

impl ReportRepoFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }

    pub fn build_yantek_report_repo(&self, executor: &Executor) -> Arc<YantekReportRepositoryImpl> {
        Arc::new(YantekReportRepositoryImpl::new(executor.clone()))
    }

    pub fn build_connection_report_repo(&self, executor: &Executor) -> Arc<ConnectionReportRepositoryImpl> {
        Arc::new(ConnectionReportRepositoryImpl::new(executor.clone()))
    }

    pub fn build_activity_log_repo(&self, executor: &Executor) -> Arc<ActivityLogRepositoryImpl> {
        Arc::new(ActivityLogRepositoryImpl::new(executor.clone()))
    }

    /// Build all report repositories sharing the given executor
    pub fn build_all_repos(&self, executor: &Executor) -> ReportRepositories {
        ReportRepositories {
            yantek_report_repository: self.build_yantek_report_repo(executor),
            connection_report_repository: self.build_connection_report_repo(executor),
            activity_log_repository: self.build_activity_log_repo(executor),
        }
    }
}

/// Container for all report module repositories
pub struct ReportRepositories {
    pub yantek_report_repository: Arc<YantekReportRepositoryImpl>,
    pub connection_report_repository: Arc<ConnectionReportRepositoryImpl>,
    pub activity_log_repository: Arc<ActivityLogRepositoryImpl>,
}
