//! Orchestration of the report state machine.
//!
//! Every mutating operation follows the same shape: validate, stage files,
//! run one transaction (allocating the id inside it), then record the event
//! in the ledger once the transaction has committed. Files staged for a
//! transaction that did not commit are removed again.

mod complete;
mod create;
mod delete;
mod update_status;

use meter_report_api::{ReportError, ReportResult};
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::error::as_duplicate_key;
use meter_report_db::repository::unit_of_work::{UnitOfWork, UnitOfWorkSession};
use meter_report_db::utils::BoundedStringError;
use std::sync::Arc;

use crate::error::{internal, BoxError, TxError};
use crate::id_allocator::SequentialIdAllocator;
use crate::ledger::ActivityLedger;
use crate::session::{abandon, commit};
use crate::stager::ArtifactStager;

/// Creates, completes, transitions and deletes report pairs.
pub struct ReportLifecycle {
    uow: Arc<dyn UnitOfWork>,
    allocator: SequentialIdAllocator,
    stager: Arc<ArtifactStager>,
    ledger: Arc<ActivityLedger>,
    id_allocation_attempts: usize,
}

impl ReportLifecycle {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        stager: Arc<ArtifactStager>,
        ledger: Arc<ActivityLedger>,
        id_allocation_attempts: usize,
    ) -> Self {
        Self {
            uow,
            allocator: SequentialIdAllocator::new(),
            stager,
            ledger,
            id_allocation_attempts: id_allocation_attempts.max(1),
        }
    }

    async fn begin(&self, operation: &str) -> ReportResult<Box<dyn UnitOfWorkSession>> {
        self.uow
            .begin()
            .await
            .map_err(|e| internal(format!("Failed to start transaction for {operation}"), e))
    }

    /// Parent report and its connection report, read in a short session of their own.
    async fn load_pair(&self, yantek_report_id: &str) -> ReportResult<(YantekReportModel, Option<ConnectionReportModel>)> {
        let session = self.begin("loading a report").await?;
        let result = async {
            let report = session
                .yantek_reports()
                .find_by_id(yantek_report_id)
                .await
                .map_err(|e| internal(format!("Failed to load Yantek report {yantek_report_id}"), e))?
                .ok_or_else(|| not_found(yantek_report_id))?;
            let connection = session
                .connection_reports()
                .find_by_yantek_report_id(yantek_report_id)
                .await
                .map_err(|e| internal(format!("Failed to load the connection report of {yantek_report_id}"), e))?;
            Ok::<_, ReportError>((report, connection))
        }
        .await;
        abandon(session, "loading a report").await;
        result
    }
}

pub(crate) fn not_found(yantek_report_id: &str) -> ReportError {
    ReportError::NotFound(format!("Yantek report {yantek_report_id} not found"))
}

/// Sorts an insert failure into "retry with a fresh id", "conflict" or "internal".
fn classify_insert(err: BoxError, id_constraint: &str, operation: &str) -> TxError {
    match as_duplicate_key(err.as_ref()) {
        Some(dup) if dup.constraint == id_constraint => TxError::IdCollision(dup.clone()),
        Some(dup) => TxError::Failed(ReportError::Conflict(format!("{operation} rejected: {dup}"))),
        None => TxError::Failed(internal(format!("Failed to {operation}"), err)),
    }
}

fn invalid_input(err: BoundedStringError) -> ReportError {
    ReportError::ValidationFailed(err.to_string())
}

fn invalid_path(err: BoundedStringError) -> ReportError {
    ReportError::Internal(format!("Stored attachment path does not fit: {err}"))
}
