use meter_report_api::{ActivityType, ApiResponse, AuthContext, DeletedReport, ReportResult};
use tracing::{error, info, warn, Instrument};

use super::{abandon, commit, not_found, ReportLifecycle};
use crate::error::{internal, BoxError};
use crate::ledger::LedgerEntry;
use crate::observability::lifecycle_span;

const OPERATION: &str = "delete report";

impl ReportLifecycle {
    /// Deletes a Yantek report, its connection report and every file they reference.
    ///
    /// The deletion is recorded before the rows go. The files to remove are
    /// read inside the delete transaction with the parent locked, so a
    /// completion committed after the first read still has its files removed.
    /// Files are removed only after the delete committed; if the delete
    /// fails, rows and files both stay.
    pub async fn delete_report(
        &self,
        yantek_report_id: &str,
        auth: &AuthContext,
    ) -> ReportResult<ApiResponse<DeletedReport>> {
        async {
            let (_, known_connection) = self.load_pair(yantek_report_id).await?;

            let mut entry = LedgerEntry::new(
                ActivityType::ReportDeleted,
                auth.actor_id,
                yantek_report_id,
                format!("Yantek report {yantek_report_id} deleted"),
            )
            .with_deleted_report(yantek_report_id);
            if let Some(connection) = &known_connection {
                entry = entry.with_connection(connection.id.as_str());
            }
            self.ledger.record(entry).await;

            let session = self.begin(OPERATION).await?;
            let deleted = async {
                let Some(report) = session.yantek_reports().lock_by_id(yantek_report_id).await? else {
                    return Ok(None);
                };
                let connection = session
                    .connection_reports()
                    .find_by_yantek_report_id(yantek_report_id)
                    .await?;
                let children = session
                    .connection_reports()
                    .delete_by_yantek_report_id(yantek_report_id)
                    .await?;
                let removed = session.yantek_reports().delete(yantek_report_id).await?;
                Ok::<_, BoxError>(removed.then_some((report, connection, children)))
            }
            .await;

            let (report, connection, children) = match deleted {
                Ok(Some(rows)) => {
                    commit(session, OPERATION).await?;
                    rows
                }
                Ok(None) => {
                    abandon(session, OPERATION).await;
                    return Err(not_found(yantek_report_id));
                }
                Err(err) => {
                    abandon(session, OPERATION).await;
                    error!(error = %err, "deleting report rows failed");
                    return Err(internal(format!("Failed to delete Yantek report {yantek_report_id}"), err));
                }
            };

            if known_connection.is_none() {
                if let Some(connection) = &connection {
                    warn!(connection_id = %connection.id, "connection report completed while the delete was pending");
                }
            }

            let mut paths: Vec<String> = report.attachment_paths().into_iter().map(str::to_string).collect();
            if let Some(connection) = &connection {
                paths.extend(connection.attachment_paths().into_iter().map(str::to_string));
            }
            let failures = self.stager.unstage_all(&paths).await;
            if failures > 0 {
                warn!(failures, "some attachments of the deleted report were left behind");
            }

            info!(children, files = paths.len(), actor = %auth.actor_id, "report deleted");
            Ok(ApiResponse::ok(
                "Report deleted",
                DeletedReport {
                    id: yantek_report_id.to_string(),
                },
            ))
        }
        .instrument(lifecycle_span("delete_report", Some(yantek_report_id)))
        .await
    }
}
