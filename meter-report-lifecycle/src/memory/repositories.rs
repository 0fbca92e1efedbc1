use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meter_report_api::ActivityType;
use meter_report_db::models::activity_log::ActivityLogModel;
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::models::identifiable::Identifiable;
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::error::{constraints, DuplicateKeyError};
use meter_report_db::repository::pagination::{Page, PageRequest};
use meter_report_db::repository::{
    ActivityLogRepository, ConnectionReportFilter, ConnectionReportRepository, YantekReportFilter,
    YantekReportRepository,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use uuid::Uuid;

use super::unit_of_work::{FaultInjection, MemoryState};
use crate::error::BoxError;

fn max_id_in_range<'a>(ids: impl Iterator<Item = &'a String>, lower: &str, upper: &str) -> Option<String> {
    ids.filter(|id| id.as_str() >= lower && id.as_str() <= upper)
        .max()
        .cloned()
}

/// Inserts `row` under its id. Returns false, leaving the table untouched, if the id is taken.
fn insert_row<T: Identifiable + Clone>(table: &mut BTreeMap<String, T>, row: &T) -> bool {
    if table.contains_key(row.get_id()) {
        return false;
    }
    table.insert(row.get_id().to_string(), row.clone());
    true
}

fn matches_yantek_filter(state: &MemoryState, filter: &YantekReportFilter, report: &YantekReportModel) -> bool {
    if !filter.matches_row(report) {
        return false;
    }
    match filter.has_connection_report {
        None => true,
        Some(expected) => {
            let has = state
                .connection_reports
                .values()
                .any(|c| c.yantek_report_id == report.id);
            has == expected
        }
    }
}

pub(super) struct MemoryYantekReportRepository {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<FaultInjection>,
}

impl MemoryYantekReportRepository {
    pub(super) fn new(state: Arc<Mutex<MemoryState>>, faults: Arc<FaultInjection>) -> Self {
        Self { state, faults }
    }
}

#[async_trait]
impl YantekReportRepository for MemoryYantekReportRepository {
    async fn create(&self, report: &YantekReportModel) -> Result<YantekReportModel, BoxError> {
        FaultInjection::check(&self.faults.fail_yantek_insert, "insert yantek_report")?;
        if self.faults.take_collision() {
            return Err(Box::new(DuplicateKeyError::new(constraints::YANTEK_REPORT_PKEY)));
        }
        if !insert_row(&mut self.state.lock().yantek_reports, report) {
            self.faults.rejected_yantek_ids.fetch_add(1, Ordering::SeqCst);
            return Err(Box::new(DuplicateKeyError::new(constraints::YANTEK_REPORT_PKEY)));
        }
        Ok(report.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<YantekReportModel>, BoxError> {
        Ok(self.state.lock().yantek_reports.get(id).cloned())
    }

    async fn lock_by_id(&self, id: &str) -> Result<Option<YantekReportModel>, BoxError> {
        self.find_by_id(id).await
    }

    async fn find_max_id_in_range(&self, lower: &str, upper: &str) -> Result<Option<String>, BoxError> {
        let max = max_id_in_range(self.state.lock().yantek_reports.keys(), lower, upper);
        if let Some(rendezvous) = self.faults.max_id_rendezvous() {
            rendezvous.wait().await;
        }
        Ok(max)
    }

    async fn update(&self, report: &YantekReportModel) -> Result<YantekReportModel, BoxError> {
        let mut state = self.state.lock();
        let stored = state
            .yantek_reports
            .get_mut(report.id.as_str())
            .ok_or_else(|| format!("Yantek report {} does not exist", report.id))?;
        stored.technician_name = report.technician_name.clone();
        stored.meter_type = report.meter_type;
        stored.status = report.status;
        stored.updated_at = report.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, BoxError> {
        FaultInjection::check(&self.faults.fail_delete, "delete yantek_report")?;
        let mut state = self.state.lock();
        if state.connection_reports.values().any(|c| c.yantek_report_id.as_str() == id) {
            return Err(format!("Yantek report {id} is still referenced by a connection report").into());
        }
        Ok(state.yantek_reports.remove(id).is_some())
    }

    async fn find_page(
        &self,
        filter: &YantekReportFilter,
        page: PageRequest,
    ) -> Result<Page<YantekReportModel>, BoxError> {
        let state = self.state.lock();
        let mut matching: Vec<YantekReportModel> = state
            .yantek_reports
            .values()
            .filter(|r| matches_yantek_filter(&state, filter, r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::from_filtered(matching, page))
    }

    async fn count(&self, filter: &YantekReportFilter) -> Result<usize, BoxError> {
        let state = self.state.lock();
        Ok(state
            .yantek_reports
            .values()
            .filter(|r| matches_yantek_filter(&state, filter, r))
            .count())
    }

    async fn count_created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<usize, BoxError> {
        Ok(self
            .state
            .lock()
            .yantek_reports
            .values()
            .filter(|r| r.created_at >= from && r.created_at < to)
            .count())
    }
}

pub(super) struct MemoryConnectionReportRepository {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<FaultInjection>,
}

impl MemoryConnectionReportRepository {
    pub(super) fn new(state: Arc<Mutex<MemoryState>>, faults: Arc<FaultInjection>) -> Self {
        Self { state, faults }
    }
}

#[async_trait]
impl ConnectionReportRepository for MemoryConnectionReportRepository {
    async fn create(&self, report: &ConnectionReportModel) -> Result<ConnectionReportModel, BoxError> {
        FaultInjection::check(&self.faults.fail_connection_insert, "insert connection_report")?;
        let mut state = self.state.lock();
        if !state.yantek_reports.contains_key(report.yantek_report_id.as_str()) {
            return Err(format!("Yantek report {} does not exist", report.yantek_report_id).into());
        }
        if state
            .connection_reports
            .values()
            .any(|c| c.yantek_report_id == report.yantek_report_id)
        {
            return Err(Box::new(DuplicateKeyError::new(constraints::CONNECTION_REPORT_PARENT_KEY)));
        }
        if !insert_row(&mut state.connection_reports, report) {
            return Err(Box::new(DuplicateKeyError::new(constraints::CONNECTION_REPORT_PKEY)));
        }
        Ok(report.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ConnectionReportModel>, BoxError> {
        Ok(self.state.lock().connection_reports.get(id).cloned())
    }

    async fn find_by_yantek_report_id(&self, yantek_report_id: &str) -> Result<Option<ConnectionReportModel>, BoxError> {
        Ok(self
            .state
            .lock()
            .connection_reports
            .values()
            .find(|c| c.yantek_report_id.as_str() == yantek_report_id)
            .cloned())
    }

    async fn find_by_yantek_report_ids(&self, yantek_report_ids: &[String]) -> Result<Vec<ConnectionReportModel>, BoxError> {
        Ok(self
            .state
            .lock()
            .connection_reports
            .values()
            .filter(|c| yantek_report_ids.iter().any(|id| id.as_str() == c.yantek_report_id.as_str()))
            .cloned()
            .collect())
    }

    async fn find_max_id_in_range(&self, lower: &str, upper: &str) -> Result<Option<String>, BoxError> {
        Ok(max_id_in_range(self.state.lock().connection_reports.keys(), lower, upper))
    }

    async fn delete_by_yantek_report_id(&self, yantek_report_id: &str) -> Result<usize, BoxError> {
        FaultInjection::check(&self.faults.fail_delete, "delete connection_report")?;
        let mut state = self.state.lock();
        let before = state.connection_reports.len();
        state
            .connection_reports
            .retain(|_, c| c.yantek_report_id.as_str() != yantek_report_id);
        Ok(before - state.connection_reports.len())
    }

    async fn find_page(
        &self,
        filter: &ConnectionReportFilter,
        page: PageRequest,
    ) -> Result<Page<ConnectionReportModel>, BoxError> {
        let mut matching: Vec<ConnectionReportModel> = self
            .state
            .lock()
            .connection_reports
            .values()
            .filter(|c| filter.matches_row(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(Page::from_filtered(matching, page))
    }
}

pub(super) struct MemoryActivityLogRepository {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<FaultInjection>,
}

impl MemoryActivityLogRepository {
    pub(super) fn new(state: Arc<Mutex<MemoryState>>, faults: Arc<FaultInjection>) -> Self {
        Self { state, faults }
    }
}

#[async_trait]
impl ActivityLogRepository for MemoryActivityLogRepository {
    async fn create(&self, entry: &ActivityLogModel) -> Result<ActivityLogModel, BoxError> {
        FaultInjection::check(&self.faults.fail_activity_append, "insert activity_log")?;
        self.state.lock().activity_logs.push(entry.clone());
        Ok(entry.clone())
    }

    async fn find_recent(&self, limit: usize, types: &[ActivityType]) -> Result<Vec<ActivityLogModel>, BoxError> {
        let state = self.state.lock();
        // Appends arrive in time order; reverse iteration is newest first.
        Ok(state
            .activity_logs
            .iter()
            .rev()
            .filter(|e| types.is_empty() || types.contains(&e.activity_type))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_type_and_actor(
        &self,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> Result<Vec<ActivityLogModel>, BoxError> {
        Ok(self
            .state
            .lock()
            .activity_logs
            .iter()
            .filter(|e| e.activity_type == activity_type && e.actor_user_id == actor_user_id)
            .cloned()
            .collect())
    }
}
