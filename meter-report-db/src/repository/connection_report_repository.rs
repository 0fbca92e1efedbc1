use async_trait::async_trait;

use crate::models::connection_report::ConnectionReportModel;
use crate::repository::pagination::{Page, PageRequest};

/// Row filter for connection report listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionReportFilter {
    /// `Some(vec![])` matches nothing
    pub ids: Option<Vec<String>>,
}

impl ConnectionReportFilter {
    pub fn restricted_to(ids: Vec<String>) -> Self {
        Self { ids: Some(ids) }
    }

    pub fn matches_row(&self, report: &ConnectionReportModel) -> bool {
        match &self.ids {
            Some(ids) => ids.iter().any(|id| id.as_str() == report.id.as_str()),
            None => true,
        }
    }
}

/// Repository for the `connection_report` table
///
/// Connection reports are insert-only; they disappear together with their parent.
#[async_trait]
pub trait ConnectionReportRepository: Send + Sync {
    /// Insert a new connection report
    ///
    /// # Returns
    /// * `Err` - A [`DuplicateKeyError`](crate::repository::error::DuplicateKeyError) naming
    ///   the primary key or the one-per-parent key on a collision
    async fn create(&self, report: &ConnectionReportModel) -> Result<ConnectionReportModel, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ConnectionReportModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// The connection report completing `yantek_report_id`, if any
    async fn find_by_yantek_report_id(
        &self,
        yantek_report_id: &str,
    ) -> Result<Option<ConnectionReportModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Connection reports of several parents, in no particular order
    async fn find_by_yantek_report_ids(
        &self,
        yantek_report_ids: &[String],
    ) -> Result<Vec<ConnectionReportModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Greatest id within the closed range `[lower, upper]`
    async fn find_max_id_in_range(&self, lower: &str, upper: &str) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Delete every connection report of a parent
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of deleted rows
    async fn delete_by_yantek_report_id(&self, yantek_report_id: &str) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// One page of matching connection reports, newest first
    async fn find_page(
        &self,
        filter: &ConnectionReportFilter,
        page: PageRequest,
    ) -> Result<Page<ConnectionReportModel>, Box<dyn std::error::Error + Send + Sync>>;
}
