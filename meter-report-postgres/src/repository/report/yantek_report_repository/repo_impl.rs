use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::pagination::{Page, PageRequest};
use meter_report_db::repository::yantek_report_repository::{YantekReportFilter, YantekReportRepository};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use std::error::Error;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

/// `WHERE` clause for [`YantekReportFilter`], expecting the filter in `$1..$4`.
pub(super) const FILTER_CLAUSE: &str = r#"
    (cardinality($1::text[]) = 0 OR y.status::text = ANY($1))
    AND ($2::text[] IS NULL OR y.id = ANY($2))
    AND ($3::bool IS NULL OR EXISTS (
        SELECT 1 FROM connection_report c WHERE c.yantek_report_id = y.id
    ) = $3)
    AND ($4::text IS NULL OR y.technician_name = $4)
"#;

/// Binds the four filter parameters of [`FILTER_CLAUSE`].
pub(super) fn bind_filter<'q>(
    query: Query<'q, Postgres, PgArguments>,
    filter: &YantekReportFilter,
) -> Query<'q, Postgres, PgArguments> {
    let statuses: Vec<String> = filter.statuses.iter().map(|s| s.as_str().to_string()).collect();
    query
        .bind(statuses)
        .bind(filter.ids.clone())
        .bind(filter.has_connection_report)
        .bind(filter.technician_name.clone())
}

pub struct YantekReportRepositoryImpl {
    pub(crate) executor: Executor,
}

impl YantekReportRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for YantekReportModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(YantekReportModel {
            id: get_heapless_string(row, "id")?,
            customer_id: get_heapless_string(row, "customer_id")?,
            meter_number: get_heapless_string(row, "meter_number")?,
            meter_type: row.try_get("meter_type")?,
            customer_phone: get_heapless_string(row, "customer_phone")?,
            technician_name: get_heapless_string(row, "technician_name")?,
            meter_reading_at_removal: get_optional_heapless_string(row, "meter_reading_at_removal")?,
            remaining_credit: get_optional_heapless_string(row, "remaining_credit")?,
            coordinates: get_heapless_string(row, "coordinates")?,
            notes: get_optional_heapless_string(row, "notes")?,
            house_photo_path: get_heapless_string(row, "house_photo_path")?,
            broken_meter_photo_path: get_heapless_string(row, "broken_meter_photo_path")?,
            technician_photo_path: get_heapless_string(row, "technician_photo_path")?,
            incident_report_photo_path: get_heapless_string(row, "incident_report_photo_path")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl YantekReportRepository for YantekReportRepositoryImpl {
    async fn create(&self, report: &YantekReportModel) -> Result<YantekReportModel, Box<dyn Error + Send + Sync>> {
        Self::create_impl(self, report).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<YantekReportModel>, Box<dyn Error + Send + Sync>> {
        Self::find_by_id_impl(self, id, false).await
    }

    async fn lock_by_id(&self, id: &str) -> Result<Option<YantekReportModel>, Box<dyn Error + Send + Sync>> {
        Self::find_by_id_impl(self, id, true).await
    }

    async fn find_max_id_in_range(&self, lower: &str, upper: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        Self::find_max_id_in_range_impl(self, lower, upper).await
    }

    async fn update(&self, report: &YantekReportModel) -> Result<YantekReportModel, Box<dyn Error + Send + Sync>> {
        Self::update_impl(self, report).await
    }

    async fn delete(&self, id: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Self::delete_impl(self, id).await
    }

    async fn find_page(
        &self,
        filter: &YantekReportFilter,
        page: PageRequest,
    ) -> Result<Page<YantekReportModel>, Box<dyn Error + Send + Sync>> {
        Self::find_page_impl(self, filter, page).await
    }

    async fn count(&self, filter: &YantekReportFilter) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Self::count_impl(self, filter).await
    }

    async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Self::count_created_between_impl(self, from, to).await
    }
}
