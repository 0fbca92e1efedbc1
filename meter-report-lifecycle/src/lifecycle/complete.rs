use chrono::Utc;
use meter_report_api::{
    ActivityType, ApiResponse, AttachmentSlot, AuthContext, CompleteReportRequest, ConnectionAttachments, ReportError,
    ReportResult, ReportStatus,
};
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::models::report_id::{ReportId, ReportPrefix, YearMonth};
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::error::constraints;
use meter_report_db::utils::bounded;
use tracing::{error, info, warn, Instrument};
use validator::Validate;

use super::{abandon, classify_insert, commit, invalid_input, invalid_path, not_found, ReportLifecycle};
use crate::error::{internal, TxError};
use crate::ledger::LedgerEntry;
use crate::observability::lifecycle_span;
use crate::stager::StagedArtifacts;

const OPERATION: &str = "insert connection report";

/// Rejects parents that can no longer be completed.
fn ensure_completable(parent: &YantekReportModel, existing: Option<&ConnectionReportModel>) -> ReportResult<()> {
    if parent.status.is_terminal() {
        return Err(ReportError::Conflict(format!("Yantek report {} is already DONE", parent.id)));
    }
    if let Some(existing) = existing {
        return Err(ReportError::Conflict(format!(
            "Yantek report {} already has connection report {}",
            parent.id, existing.id
        )));
    }
    Ok(())
}

impl ReportLifecycle {
    /// Closes a Yantek report with a connection report and marks the parent `DONE`.
    ///
    /// The parent is checked before anything is staged and again, under a row
    /// lock, inside the transaction.
    ///
    /// # Errors
    /// * `NotFound` - no Yantek report with that id
    /// * `Conflict` - the parent is `DONE` or already has a connection report
    /// * `Internal` - staging or the transaction failed; staged files are removed
    pub async fn complete_report(
        &self,
        yantek_report_id: &str,
        request: CompleteReportRequest,
        attachments: ConnectionAttachments,
        auth: &AuthContext,
    ) -> ReportResult<ApiResponse<ConnectionReportModel>> {
        request.validate()?;
        let attachments = attachments.into_validated()?;

        async {
            let (parent, existing) = self.load_pair(yantek_report_id).await?;
            ensure_completable(&parent, existing.as_ref())?;

            let staged = self.stager.stage_all(attachments).await?;

            let connection = match self.insert_connection_report(yantek_report_id, &request, &staged).await {
                Ok(connection) => connection,
                Err(err) => {
                    let orphaned = self.stager.unstage_all(&staged.paths()).await;
                    error!(error = %err, orphaned, "completing Yantek report failed");
                    return Err(err);
                }
            };

            self.ledger
                .record(
                    LedgerEntry::new(
                        ActivityType::ReportCompleted,
                        auth.actor_id,
                        yantek_report_id,
                        format!("Yantek report {yantek_report_id} completed by connection report {}", connection.id),
                    )
                    .with_connection(connection.id.as_str()),
                )
                .await;

            info!(connection_id = %connection.id, actor = %auth.actor_id, "Yantek report completed");
            Ok(ApiResponse::created(
                "Connection report created; Yantek report marked DONE",
                connection,
            ))
        }
        .instrument(lifecycle_span("complete_report", Some(yantek_report_id)))
        .await
    }

    async fn insert_connection_report(
        &self,
        yantek_report_id: &str,
        request: &CompleteReportRequest,
        staged: &StagedArtifacts,
    ) -> ReportResult<ConnectionReportModel> {
        let mut attempt = 1;
        loop {
            match self.try_insert_connection_report(yantek_report_id, request, staged).await {
                Ok(connection) => return Ok(connection),
                Err(TxError::IdCollision(dup)) if attempt < self.id_allocation_attempts => {
                    warn!(attempt, constraint = %dup.constraint, "report id taken concurrently, retrying");
                    attempt += 1;
                }
                Err(TxError::IdCollision(dup)) => {
                    return Err(ReportError::Internal(format!(
                        "Could not allocate a unique connection report id after {attempt} attempts: {dup}"
                    )))
                }
                Err(TxError::Failed(err)) => return Err(err),
            }
        }
    }

    async fn try_insert_connection_report(
        &self,
        yantek_report_id: &str,
        request: &CompleteReportRequest,
        staged: &StagedArtifacts,
    ) -> Result<ConnectionReportModel, TxError> {
        let session = self.begin(OPERATION).await?;
        let result = async {
            let mut parent = session
                .yantek_reports()
                .lock_by_id(yantek_report_id)
                .await
                .map_err(|e| internal(format!("Failed to lock Yantek report {yantek_report_id}"), e))?
                .ok_or_else(|| not_found(yantek_report_id))?;
            let existing = session
                .connection_reports()
                .find_by_yantek_report_id(yantek_report_id)
                .await
                .map_err(|e| internal(format!("Failed to load the connection report of {yantek_report_id}"), e))?;
            ensure_completable(&parent, existing.as_ref())?;

            let id = self
                .allocator
                .next(session.as_ref(), ReportPrefix::Connection, YearMonth::current())
                .await?;
            let model = new_connection_model(id, &parent, request, staged)?;
            let connection = session
                .connection_reports()
                .create(&model)
                .await
                .map_err(|e| classify_insert(e, constraints::CONNECTION_REPORT_PKEY, OPERATION))?;

            parent.status = ReportStatus::Done;
            parent.updated_at = Utc::now();
            session
                .yantek_reports()
                .update(&parent)
                .await
                .map_err(|e| internal(format!("Failed to mark Yantek report {yantek_report_id} DONE"), e))?;
            Ok::<_, TxError>(connection)
        }
        .await;

        match result {
            Ok(connection) => {
                commit(session, OPERATION).await?;
                Ok(connection)
            }
            Err(err) => {
                abandon(session, OPERATION).await;
                Err(err)
            }
        }
    }
}

fn new_connection_model(
    id: ReportId,
    parent: &YantekReportModel,
    request: &CompleteReportRequest,
    staged: &StagedArtifacts,
) -> ReportResult<ConnectionReportModel> {
    Ok(ConnectionReportModel {
        id: bounded(&id.to_string(), "id").map_err(invalid_path)?,
        yantek_report_id: parent.id.clone(),
        technician_name: bounded(&request.technician_name, "technician_name").map_err(invalid_input)?,
        installed_meter_photo_path: bounded(
            staged.path(AttachmentSlot::InstalledMeterPhoto)?,
            "installed_meter_photo_path",
        )
        .map_err(invalid_path)?,
        customer_house_photo_path: bounded(staged.path(AttachmentSlot::CustomerHousePhoto)?, "customer_house_photo_path")
            .map_err(invalid_path)?,
        technician_photo_path: bounded(staged.path(AttachmentSlot::TechnicianPhoto)?, "technician_photo_path")
            .map_err(invalid_path)?,
        installation_report_photo_path: bounded(
            staged.path(AttachmentSlot::InstallationReportPhoto)?,
            "installation_report_photo_path",
        )
        .map_err(invalid_path)?,
        status: ReportStatus::Done,
        created_at: Utc::now(),
    })
}
