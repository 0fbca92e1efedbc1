use meter_report_db::models::yantek_report::YantekReportModel;

use super::repo_impl::YantekReportRepositoryImpl;
use crate::utils::map_write_error;

impl YantekReportRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &YantekReportRepositoryImpl,
        report: &YantekReportModel,
    ) -> Result<YantekReportModel, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query(
            r#"
            INSERT INTO yantek_report (
                id, customer_id, meter_number, meter_type, customer_phone, technician_name,
                meter_reading_at_removal, remaining_credit, coordinates, notes,
                house_photo_path, broken_meter_photo_path, technician_photo_path, incident_report_photo_path,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(report.id.as_str())
        .bind(report.customer_id.as_str())
        .bind(report.meter_number.as_str())
        .bind(report.meter_type)
        .bind(report.customer_phone.as_str())
        .bind(report.technician_name.as_str())
        .bind(report.meter_reading_at_removal.as_ref().map(|s| s.as_str()))
        .bind(report.remaining_credit.as_ref().map(|s| s.as_str()))
        .bind(report.coordinates.as_str())
        .bind(report.notes.as_ref().map(|s| s.as_str()))
        .bind(report.house_photo_path.as_str())
        .bind(report.broken_meter_photo_path.as_str())
        .bind(report.technician_photo_path.as_str())
        .bind(report.incident_report_photo_path.as_str())
        .bind(report.status)
        .bind(report.created_at)
        .bind(report.updated_at);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        query.execute(&mut **transaction).await.map_err(map_write_error)?;

        Ok(report.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::report::test_utils::create_test_yantek_report;
    use crate::test_helper::setup_test_context;
    use meter_report_db::repository::error::{as_duplicate_key, constraints};
    use meter_report_db::repository::YantekReportRepository;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_yantek_report() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().yantek_report_repository;

        let report = create_test_yantek_report("YT2099010001");
        let created = repo.create(&report).await?;
        assert_eq!(created.id, report.id);

        let found = repo.find_by_id("YT2099010001").await?.expect("report stored");
        assert_eq!(found.customer_id, report.customer_id);
        assert_eq!(found.status, report.status);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_duplicate_id_reports_primary_key() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().yantek_report_repository;

        repo.create(&create_test_yantek_report("YT2099010002")).await?;
        let err = repo.create(&create_test_yantek_report("YT2099010002")).await.unwrap_err();

        let dup = as_duplicate_key(err.as_ref()).expect("duplicate key error");
        assert_eq!(dup.constraint, constraints::YANTEK_REPORT_PKEY);

        Ok(())
    }
}
