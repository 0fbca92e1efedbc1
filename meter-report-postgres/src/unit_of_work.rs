use async_trait::async_trait;
use meter_report_db::repository::{
    ActivityLogRepository, ConnectionReportRepository, UnitOfWork, UnitOfWorkSession,
    YantekReportRepository,
};
use sqlx::PgPool;
use std::error::Error;
use std::sync::Arc;

use crate::executor::Executor;
use crate::repository::report::{ReportRepoFactory, ReportRepositories};

/// Opens one PostgreSQL transaction per session.
pub struct PgUnitOfWork {
    pool: Arc<PgPool>,
    factory: Arc<ReportRepoFactory>,
}

impl PgUnitOfWork {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            factory: ReportRepoFactory::new(),
        }
    }

    pub async fn begin_session(&self) -> Result<PgSession, Box<dyn Error + Send + Sync>> {
        let tx = self.pool.begin().await?;
        let executor = Executor::new(tx);
        let repos = self.factory.build_all_repos(&executor);
        Ok(PgSession { executor, repos })
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkSession>, Box<dyn Error + Send + Sync>> {
        Ok(Box::new(self.begin_session().await?))
    }
}

/// A transaction plus the repositories bound to it.
///
/// Dropping an uncommitted session rolls the transaction back.
pub struct PgSession {
    executor: Executor,
    repos: ReportRepositories,
}

impl PgSession {
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn repos(&self) -> &ReportRepositories {
        &self.repos
    }
}

#[async_trait]
impl UnitOfWorkSession for PgSession {
    fn yantek_reports(&self) -> Arc<dyn YantekReportRepository> {
        self.repos.yantek_report_repository.clone()
    }

    fn connection_reports(&self) -> Arc<dyn ConnectionReportRepository> {
        self.repos.connection_report_repository.clone()
    }

    fn activity_logs(&self) -> Arc<dyn ActivityLogRepository> {
        self.repos.activity_log_repository.clone()
    }

    async fn lock_id_partition(&self, prefix: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.executor.advisory_lock(prefix).await
    }

    async fn commit(self: Box<Self>) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.executor.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.executor.rollback().await
    }
}
