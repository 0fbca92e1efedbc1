use async_trait::async_trait;
use meter_report_db::models::activity_log::ActivityLogModel;
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::models::identifiable::Identifiable;
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::{
    ActivityLogRepository, ConnectionReportRepository, UnitOfWork, UnitOfWorkSession,
    YantekReportRepository,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Barrier, Mutex as AsyncMutex, OwnedMutexGuard};

use super::repositories::{MemoryActivityLogRepository, MemoryConnectionReportRepository, MemoryYantekReportRepository};
use crate::error::BoxError;

/// Every table of the report schema.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub yantek_reports: BTreeMap<String, YantekReportModel>,
    pub connection_reports: BTreeMap<String, ConnectionReportModel>,
    pub activity_logs: Vec<ActivityLogModel>,
}

/// Test controls: switches that make the next matching write fail, and a
/// hook that lines up concurrent id allocations.
#[derive(Debug, Default)]
pub struct FaultInjection {
    pub fail_yantek_insert: AtomicBool,
    pub fail_connection_insert: AtomicBool,
    pub fail_activity_append: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Number of upcoming Yantek inserts rejected with a primary-key collision
    pub forced_yantek_collisions: AtomicUsize,
    /// Yantek inserts rejected because their id was already stored
    pub rejected_yantek_ids: AtomicUsize,
    max_id_rendezvous: Mutex<Option<(Arc<Barrier>, usize)>>,
}

impl FaultInjection {
    pub(super) fn take_collision(&self) -> bool {
        self.forced_yantek_collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    pub(super) fn check(flag: &AtomicBool, operation: &str) -> Result<(), BoxError> {
        if flag.load(Ordering::SeqCst) {
            return Err(format!("injected failure: {operation}").into());
        }
        Ok(())
    }

    /// Makes the next `parties` Yantek max-id reads wait for each other, so all
    /// of them see the same greatest id. Needs a store without isolation;
    /// serialised sessions would wait on each other forever.
    pub fn hold_yantek_max_id_reads(&self, parties: usize) {
        *self.max_id_rendezvous.lock() = (parties > 0).then(|| (Arc::new(Barrier::new(parties)), parties));
    }

    pub(super) fn max_id_rendezvous(&self) -> Option<Arc<Barrier>> {
        let mut slot = self.max_id_rendezvous.lock();
        let (barrier, remaining) = slot.as_mut()?;
        let barrier = barrier.clone();
        *remaining -= 1;
        if *remaining == 0 {
            *slot = None;
        }
        Some(barrier)
    }
}

/// Transactional in-memory storage.
///
/// The default store serialises sessions. [`without_isolation`](Self::without_isolation)
/// builds one whose sessions write straight into shared tables, like
/// autocommit connections racing each other.
#[derive(Clone, Default)]
pub struct MemoryUnitOfWork {
    state: Arc<AsyncMutex<MemoryState>>,
    shared: Option<Arc<Mutex<MemoryState>>>,
    faults: Arc<FaultInjection>,
}

impl MemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_isolation() -> Self {
        Self {
            shared: Some(Arc::new(Mutex::new(MemoryState::default()))),
            ..Self::default()
        }
    }

    pub fn faults(&self) -> &FaultInjection {
        &self.faults
    }

    /// Committed state; waits for the open session, if any.
    pub async fn snapshot(&self) -> MemoryState {
        match &self.shared {
            Some(shared) => shared.lock().clone(),
            None => self.state.lock().await.clone(),
        }
    }

    async fn write(&self, apply: impl FnOnce(&mut MemoryState)) {
        match &self.shared {
            Some(shared) => apply(&mut *shared.lock()),
            None => apply(&mut *self.state.lock().await),
        }
    }

    pub async fn seed_yantek(&self, report: YantekReportModel) {
        self.write(|state| {
            state.yantek_reports.insert(report.get_id().to_string(), report);
        })
        .await;
    }

    pub async fn seed_connection(&self, report: ConnectionReportModel) {
        self.write(|state| {
            state.connection_reports.insert(report.get_id().to_string(), report);
        })
        .await;
    }

    pub async fn begin_session(&self) -> MemorySession {
        match &self.shared {
            Some(shared) => MemorySession::bound(None, shared.clone(), &self.faults),
            None => {
                let guard = self.state.clone().lock_owned().await;
                let working = Arc::new(Mutex::new(guard.clone()));
                MemorySession::bound(Some(guard), working, &self.faults)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkSession>, BoxError> {
        Ok(Box::new(self.begin_session().await))
    }
}

/// Session over the store. A serialised session holds the store until it ends
/// and works on a private copy; dropping it discards that copy.
pub struct MemorySession {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    working: Arc<Mutex<MemoryState>>,
    yantek_reports: Arc<MemoryYantekReportRepository>,
    connection_reports: Arc<MemoryConnectionReportRepository>,
    activity_logs: Arc<MemoryActivityLogRepository>,
}

impl MemorySession {
    fn bound(
        guard: Option<OwnedMutexGuard<MemoryState>>,
        working: Arc<Mutex<MemoryState>>,
        faults: &Arc<FaultInjection>,
    ) -> Self {
        Self {
            guard,
            yantek_reports: Arc::new(MemoryYantekReportRepository::new(working.clone(), faults.clone())),
            connection_reports: Arc::new(MemoryConnectionReportRepository::new(working.clone(), faults.clone())),
            activity_logs: Arc::new(MemoryActivityLogRepository::new(working.clone(), faults.clone())),
            working,
        }
    }
}

#[async_trait]
impl UnitOfWorkSession for MemorySession {
    fn yantek_reports(&self) -> Arc<dyn YantekReportRepository> {
        self.yantek_reports.clone()
    }

    fn connection_reports(&self) -> Arc<dyn ConnectionReportRepository> {
        self.connection_reports.clone()
    }

    fn activity_logs(&self) -> Arc<dyn ActivityLogRepository> {
        self.activity_logs.clone()
    }

    async fn lock_id_partition(&self, _prefix: &str) -> Result<(), BoxError> {
        // Sessions are already exclusive.
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        let MemorySession { guard, working, .. } = *self;
        if let Some(mut guard) = guard {
            *guard = working.lock().clone();
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), BoxError> {
        Ok(())
    }
}
