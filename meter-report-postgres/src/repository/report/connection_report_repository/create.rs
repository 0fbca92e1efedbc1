use meter_report_db::models::connection_report::ConnectionReportModel;

use super::repo_impl::ConnectionReportRepositoryImpl;
use crate::utils::map_write_error;

impl ConnectionReportRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &ConnectionReportRepositoryImpl,
        report: &ConnectionReportModel,
    ) -> Result<ConnectionReportModel, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query(
            r#"
            INSERT INTO connection_report (
                id, yantek_report_id, technician_name,
                installed_meter_photo_path, customer_house_photo_path,
                technician_photo_path, installation_report_photo_path,
                status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(report.id.as_str())
        .bind(report.yantek_report_id.as_str())
        .bind(report.technician_name.as_str())
        .bind(report.installed_meter_photo_path.as_str())
        .bind(report.customer_house_photo_path.as_str())
        .bind(report.technician_photo_path.as_str())
        .bind(report.installation_report_photo_path.as_str())
        .bind(report.status)
        .bind(report.created_at);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        query.execute(&mut **transaction).await.map_err(map_write_error)?;

        Ok(report.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::report::test_utils::{create_test_connection_report, create_test_yantek_report};
    use crate::test_helper::setup_test_context;
    use meter_report_db::repository::error::{as_duplicate_key, constraints};
    use meter_report_db::repository::{ConnectionReportRepository, YantekReportRepository};

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_second_connection_report_for_parent_is_rejected() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let yantek_repo = &ctx.report_repos().yantek_report_repository;
        let connection_repo = &ctx.report_repos().connection_report_repository;

        yantek_repo.create(&create_test_yantek_report("YT2099110001")).await?;
        connection_repo.create(&create_test_connection_report("PS2099110001", "YT2099110001")).await?;

        let err = connection_repo
            .create(&create_test_connection_report("PS2099110002", "YT2099110001"))
            .await
            .unwrap_err();
        let dup = as_duplicate_key(err.as_ref()).expect("duplicate key error");
        assert_eq!(dup.constraint, constraints::CONNECTION_REPORT_PARENT_KEY);
        Ok(())
    }
}
