use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meter_report_api::ReportStatus;

use crate::models::yantek_report::YantekReportModel;
use crate::repository::pagination::{Page, PageRequest};

/// Row filter shared by Yantek listings and counts.
///
/// Every criterion is optional and they combine with AND. An empty
/// `statuses` list means "any status"; `ids: Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YantekReportFilter {
    pub statuses: Vec<ReportStatus>,
    pub ids: Option<Vec<String>>,
    pub has_connection_report: Option<bool>,
    pub technician_name: Option<String>,
}

impl YantekReportFilter {
    pub fn with_statuses(statuses: &[ReportStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Default::default()
        }
    }

    /// Restricts the filter to the given report ids.
    pub fn restricted_to(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// True if `report` satisfies every criterion except `has_connection_report`,
    /// which needs the connection table to decide.
    pub fn matches_row(&self, report: &YantekReportModel) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&report.status) {
            return false;
        }
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| id.as_str() == report.id.as_str()) {
                return false;
            }
        }
        if let Some(name) = &self.technician_name {
            if report.technician_name.as_str() != name {
                return false;
            }
        }
        true
    }
}

/// Repository for the `yantek_report` table
///
/// All methods run on the transaction of the unit-of-work session the
/// repository was built from.
///
/// # Example
/// ```ignore
/// let session = unit_of_work.begin().await?;
/// let report = session.yantek_reports().find_by_id("YT2025010001").await?;
/// session.commit().await?;
/// ```
#[async_trait]
pub trait YantekReportRepository: Send + Sync {
    /// Insert a new report
    ///
    /// # Returns
    /// * `Ok(YantekReportModel)` - The stored report
    /// * `Err` - A [`DuplicateKeyError`](crate::repository::error::DuplicateKeyError) if the id is taken,
    ///   or any other error if the insert could not be executed
    async fn create(&self, report: &YantekReportModel) -> Result<YantekReportModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Find a report by id
    async fn find_by_id(&self, id: &str) -> Result<Option<YantekReportModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Find a report by id and lock its row until the session ends
    ///
    /// Used by transitions that must re-check the status inside their transaction.
    async fn lock_by_id(&self, id: &str) -> Result<Option<YantekReportModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Greatest id within the closed range `[lower, upper]`
    ///
    /// # Returns
    /// * `Ok(None)` - If no id of the range has been issued yet
    async fn find_max_id_in_range(&self, lower: &str, upper: &str) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Overwrite the mutable columns (`technician_name`, `meter_type`, `status`, `updated_at`)
    ///
    /// # Returns
    /// * `Ok(YantekReportModel)` - The report as stored
    /// * `Err` - If the report does not exist or the update failed
    async fn update(&self, report: &YantekReportModel) -> Result<YantekReportModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Delete a report by id
    ///
    /// # Returns
    /// * `Ok(true)` - The row was deleted
    /// * `Ok(false)` - No row with that id existed
    async fn delete(&self, id: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// One page of matching reports, newest first
    async fn find_page(
        &self,
        filter: &YantekReportFilter,
        page: PageRequest,
    ) -> Result<Page<YantekReportModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Number of matching reports
    async fn count(&self, filter: &YantekReportFilter) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// Number of reports with `from <= created_at < to`
    async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}
