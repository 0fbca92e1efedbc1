use async_trait::async_trait;
use std::sync::Arc;

use crate::repository::activity_log_repository::ActivityLogRepository;
use crate::repository::connection_report_repository::ConnectionReportRepository;
use crate::repository::yantek_report_repository::YantekReportRepository;

/// One open transaction and the repositories bound to it.
///
/// Dropping a session without calling [`commit`](UnitOfWorkSession::commit)
/// discards its writes.
#[async_trait]
pub trait UnitOfWorkSession: Send + Sync {
    fn yantek_reports(&self) -> Arc<dyn YantekReportRepository>;

    fn connection_reports(&self) -> Arc<dyn ConnectionReportRepository>;

    fn activity_logs(&self) -> Arc<dyn ActivityLogRepository>;

    /// Serialise concurrent id allocation for `prefix` until the session ends
    ///
    /// Backends whose sessions are already serialised may treat this as a no-op.
    async fn lock_id_partition(&self, prefix: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn commit(self: Box<Self>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn rollback(self: Box<Self>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Entry point of a storage backend: opens transactional sessions.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkSession>, Box<dyn std::error::Error + Send + Sync>>;
}
