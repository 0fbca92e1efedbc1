use meter_report_db::models::connection_report::ConnectionReportModel;

use super::repo_impl::ConnectionReportRepositoryImpl;

impl ConnectionReportRepositoryImpl {
    pub(super) async fn find_by_yantek_report_ids_impl(
        repo: &ConnectionReportRepositoryImpl,
        yantek_report_ids: &[String],
    ) -> Result<Vec<ConnectionReportModel>, Box<dyn std::error::Error + Send + Sync>> {
        if yantek_report_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = sqlx::query("SELECT * FROM connection_report WHERE yantek_report_id = ANY($1)")
            .bind(yantek_report_ids.to_vec());
        repo.fetch_models(query).await
    }
}
