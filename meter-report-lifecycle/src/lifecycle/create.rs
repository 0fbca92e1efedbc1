use chrono::Utc;
use meter_report_api::{
    ActivityType, ApiResponse, AttachmentSlot, AuthContext, CreateYantekRequest, ReportError, ReportResult, ReportStatus,
    YantekAttachments,
};
use meter_report_db::models::report_id::{ReportId, ReportPrefix, YearMonth};
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::error::constraints;
use meter_report_db::utils::{bounded, bounded_opt};
use tracing::{error, info, warn, Instrument, Span};
use validator::Validate;

use super::{abandon, classify_insert, commit, invalid_input, invalid_path, ReportLifecycle};
use crate::error::TxError;
use crate::ledger::LedgerEntry;
use crate::observability::lifecycle_span;
use crate::stager::StagedArtifacts;

const OPERATION: &str = "insert yantek report";

impl ReportLifecycle {
    /// Files a new Yantek report in status `NEW`.
    ///
    /// # Errors
    /// * `ValidationFailed` - invalid input or missing/non-image photo; nothing is staged
    /// * `Internal` - staging, id allocation or the insert failed; staged files are removed
    pub async fn create_yantek_report(
        &self,
        request: CreateYantekRequest,
        attachments: YantekAttachments,
        auth: &AuthContext,
    ) -> ReportResult<ApiResponse<YantekReportModel>> {
        request.validate()?;
        let attachments = attachments.into_validated()?;

        async {
            let staged = self.stager.stage_all(attachments).await?;

            let report = match self.insert_yantek_report(&request, &staged).await {
                Ok(report) => report,
                Err(err) => {
                    let orphaned = self.stager.unstage_all(&staged.paths()).await;
                    error!(error = %err, orphaned, customer_id = %request.customer_id, "creating Yantek report failed");
                    return Err(err);
                }
            };
            Span::current().record("report_id", report.id.as_str());

            self.ledger
                .record(LedgerEntry::new(
                    ActivityType::ReportCreated,
                    auth.actor_id,
                    report.id.as_str(),
                    format!("Yantek report {} created for customer {}", report.id, report.customer_id),
                ))
                .await;

            info!(report_id = %report.id, actor = %auth.actor_id, "Yantek report created");
            Ok(ApiResponse::created("Yantek report created", report))
        }
        .instrument(lifecycle_span("create_yantek_report", None))
        .await
    }

    /// Runs the insert transaction, retrying when the allocated id was taken concurrently.
    async fn insert_yantek_report(
        &self,
        request: &CreateYantekRequest,
        staged: &StagedArtifacts,
    ) -> ReportResult<YantekReportModel> {
        let mut attempt = 1;
        loop {
            match self.try_insert_yantek_report(request, staged).await {
                Ok(report) => return Ok(report),
                Err(TxError::IdCollision(dup)) if attempt < self.id_allocation_attempts => {
                    warn!(attempt, constraint = %dup.constraint, "report id taken concurrently, retrying");
                    attempt += 1;
                }
                Err(TxError::IdCollision(dup)) => {
                    return Err(ReportError::Internal(format!(
                        "Could not allocate a unique Yantek report id after {attempt} attempts: {dup}"
                    )))
                }
                Err(TxError::Failed(err)) => return Err(err),
            }
        }
    }

    async fn try_insert_yantek_report(
        &self,
        request: &CreateYantekRequest,
        staged: &StagedArtifacts,
    ) -> Result<YantekReportModel, TxError> {
        let session = self.begin(OPERATION).await?;
        let result = async {
            let id = self
                .allocator
                .next(session.as_ref(), ReportPrefix::Yantek, YearMonth::current())
                .await?;
            let model = new_yantek_model(id, request, staged)?;
            session
                .yantek_reports()
                .create(&model)
                .await
                .map_err(|e| classify_insert(e, constraints::YANTEK_REPORT_PKEY, OPERATION))
        }
        .await;

        match result {
            Ok(report) => {
                commit(session, OPERATION).await?;
                Ok(report)
            }
            Err(err) => {
                abandon(session, OPERATION).await;
                Err(err)
            }
        }
    }
}

fn new_yantek_model(
    id: ReportId,
    request: &CreateYantekRequest,
    staged: &StagedArtifacts,
) -> ReportResult<YantekReportModel> {
    let now = Utc::now();
    Ok(YantekReportModel {
        id: bounded(&id.to_string(), "id").map_err(invalid_path)?,
        customer_id: bounded(&request.customer_id, "customer_id").map_err(invalid_input)?,
        meter_number: bounded(&request.meter_number, "meter_number").map_err(invalid_input)?,
        meter_type: request.meter_type,
        customer_phone: bounded(&request.customer_phone, "customer_phone").map_err(invalid_input)?,
        technician_name: bounded(&request.technician_name, "technician_name").map_err(invalid_input)?,
        meter_reading_at_removal: bounded_opt(request.meter_reading_at_removal.as_deref(), "meter_reading_at_removal")
            .map_err(invalid_input)?,
        remaining_credit: bounded_opt(request.remaining_credit.as_deref(), "remaining_credit").map_err(invalid_input)?,
        coordinates: bounded(&request.coordinates, "coordinates").map_err(invalid_input)?,
        notes: bounded_opt(request.notes.as_deref(), "notes").map_err(invalid_input)?,
        house_photo_path: bounded(staged.path(AttachmentSlot::HousePhoto)?, "house_photo_path").map_err(invalid_path)?,
        broken_meter_photo_path: bounded(staged.path(AttachmentSlot::BrokenMeterPhoto)?, "broken_meter_photo_path")
            .map_err(invalid_path)?,
        technician_photo_path: bounded(staged.path(AttachmentSlot::TechnicianPhoto)?, "technician_photo_path")
            .map_err(invalid_path)?,
        incident_report_photo_path: bounded(
            staged.path(AttachmentSlot::IncidentReportPhoto)?,
            "incident_report_photo_path",
        )
        .map_err(invalid_path)?,
        status: ReportStatus::New,
        created_at: now,
        updated_at: now,
    })
}
