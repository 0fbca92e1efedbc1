use chrono::Utc;
use meter_report_api::{ActivityType, ApiResponse, AuthContext, ReportError, ReportResult, ReportStatus, UpdateStatusRequest};
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::utils::bounded_opt;
use tracing::{info, Instrument};
use validator::Validate;

use super::{abandon, commit, invalid_input, not_found, ReportLifecycle};
use crate::error::internal;
use crate::ledger::LedgerEntry;
use crate::observability::lifecycle_span;

const OPERATION: &str = "update report status";

enum StatusChange {
    Unchanged(YantekReportModel),
    Applied {
        previous: ReportStatus,
        report: YantekReportModel,
    },
}

impl ReportLifecycle {
    /// Moves a Yantek report to `request.status`, optionally patching the
    /// technician name and meter type.
    ///
    /// A request that changes nothing succeeds without writing. `DONE` is
    /// terminal: moving a `DONE` report back is a `Conflict`.
    pub async fn update_status(
        &self,
        yantek_report_id: &str,
        request: UpdateStatusRequest,
        auth: &AuthContext,
    ) -> ReportResult<ApiResponse<YantekReportModel>> {
        request.validate()?;
        let technician_name =
            bounded_opt::<100>(request.technician_name.as_deref(), "technician_name").map_err(invalid_input)?;

        async {
            let session = self.begin(OPERATION).await?;
            let change = async {
                let current = session
                    .yantek_reports()
                    .lock_by_id(yantek_report_id)
                    .await
                    .map_err(|e| internal(format!("Failed to load Yantek report {yantek_report_id}"), e))?
                    .ok_or_else(|| not_found(yantek_report_id))?;

                let mut patched = current.clone();
                patched.status = request.status;
                if let Some(name) = &technician_name {
                    patched.technician_name = name.clone();
                }
                if let Some(meter_type) = request.meter_type {
                    patched.meter_type = meter_type;
                }

                if patched == current {
                    return Ok(StatusChange::Unchanged(current));
                }
                if current.status.is_terminal() && !request.status.is_terminal() {
                    return Err(ReportError::Conflict(format!(
                        "Yantek report {yantek_report_id} is DONE and cannot move back to {}",
                        request.status
                    )));
                }

                patched.updated_at = Utc::now();
                let report = session
                    .yantek_reports()
                    .update(&patched)
                    .await
                    .map_err(|e| internal(format!("Failed to update Yantek report {yantek_report_id}"), e))?;
                Ok(StatusChange::Applied {
                    previous: current.status,
                    report,
                })
            }
            .await;

            let (previous, report) = match change {
                Ok(StatusChange::Unchanged(report)) => {
                    abandon(session, OPERATION).await;
                    return Ok(ApiResponse::ok(
                        format!("Status is already {}; no change applied", report.status),
                        report,
                    ));
                }
                Ok(StatusChange::Applied { previous, report }) => {
                    commit(session, OPERATION).await?;
                    (previous, report)
                }
                Err(err) => {
                    abandon(session, OPERATION).await;
                    return Err(err);
                }
            };

            let (activity_type, message) = if previous != report.status {
                (
                    ActivityType::for_transition(report.status),
                    format!("Status of Yantek report {} changed from {previous} to {}", report.id, report.status),
                )
            } else {
                (ActivityType::ReportUpdated, format!("Yantek report {} updated", report.id))
            };
            self.ledger
                .record(LedgerEntry::new(activity_type, auth.actor_id, report.id.as_str(), message))
                .await;

            info!(%previous, status = %report.status, actor = %auth.actor_id, "Yantek report status updated");
            Ok(ApiResponse::ok("Report status updated", report))
        }
        .instrument(lifecycle_span("update_status", Some(yantek_report_id)))
        .await
    }
}
