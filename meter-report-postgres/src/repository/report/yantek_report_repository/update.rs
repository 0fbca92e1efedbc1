use meter_report_db::models::yantek_report::YantekReportModel;

use super::repo_impl::YantekReportRepositoryImpl;

impl YantekReportRepositoryImpl {
    pub(super) async fn update_impl(
        repo: &YantekReportRepositoryImpl,
        report: &YantekReportModel,
    ) -> Result<YantekReportModel, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query(
            r#"
            UPDATE yantek_report
            SET technician_name = $2, meter_type = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(report.id.as_str())
        .bind(report.technician_name.as_str())
        .bind(report.meter_type)
        .bind(report.status)
        .bind(report.updated_at);

        let result = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.execute(&mut **transaction).await?
        };

        if result.rows_affected() == 0 {
            return Err(format!("Yantek report {} does not exist", report.id).into());
        }
        Ok(report.clone())
    }
}
