use async_trait::async_trait;
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::repository::connection_report_repository::{ConnectionReportFilter, ConnectionReportRepository};
use meter_report_db::repository::pagination::{Page, PageRequest};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};

pub struct ConnectionReportRepositoryImpl {
    pub(crate) executor: Executor,
}

impl ConnectionReportRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Runs a query returning full connection report rows.
    pub(super) async fn fetch_models(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<ConnectionReportModel>, Box<dyn Error + Send + Sync>> {
        let rows = {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_all(&mut **transaction).await?
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(ConnectionReportModel::try_from_row(&row)?);
        }
        Ok(items)
    }
}

impl TryFromRow<PgRow> for ConnectionReportModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ConnectionReportModel {
            id: get_heapless_string(row, "id")?,
            yantek_report_id: get_heapless_string(row, "yantek_report_id")?,
            technician_name: get_heapless_string(row, "technician_name")?,
            installed_meter_photo_path: get_heapless_string(row, "installed_meter_photo_path")?,
            customer_house_photo_path: get_heapless_string(row, "customer_house_photo_path")?,
            technician_photo_path: get_heapless_string(row, "technician_photo_path")?,
            installation_report_photo_path: get_heapless_string(row, "installation_report_photo_path")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ConnectionReportRepository for ConnectionReportRepositoryImpl {
    async fn create(&self, report: &ConnectionReportModel) -> Result<ConnectionReportModel, Box<dyn Error + Send + Sync>> {
        Self::create_impl(self, report).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ConnectionReportModel>, Box<dyn Error + Send + Sync>> {
        let query = sqlx::query("SELECT * FROM connection_report WHERE id = $1").bind(id.to_string());
        Ok(self.fetch_models(query).await?.into_iter().next())
    }

    async fn find_by_yantek_report_id(
        &self,
        yantek_report_id: &str,
    ) -> Result<Option<ConnectionReportModel>, Box<dyn Error + Send + Sync>> {
        let ids = vec![yantek_report_id.to_string()];
        Ok(Self::find_by_yantek_report_ids_impl(self, &ids).await?.into_iter().next())
    }

    async fn find_by_yantek_report_ids(
        &self,
        yantek_report_ids: &[String],
    ) -> Result<Vec<ConnectionReportModel>, Box<dyn Error + Send + Sync>> {
        Self::find_by_yantek_report_ids_impl(self, yantek_report_ids).await
    }

    async fn find_max_id_in_range(&self, lower: &str, upper: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        Self::find_max_id_in_range_impl(self, lower, upper).await
    }

    async fn delete_by_yantek_report_id(&self, yantek_report_id: &str) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Self::delete_by_yantek_report_id_impl(self, yantek_report_id).await
    }

    async fn find_page(
        &self,
        filter: &ConnectionReportFilter,
        page: PageRequest,
    ) -> Result<Page<ConnectionReportModel>, Box<dyn Error + Send + Sync>> {
        Self::find_page_impl(self, filter, page).await
    }
}
