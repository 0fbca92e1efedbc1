use meter_report_db::models::yantek_report::YantekReportModel;

use super::repo_impl::YantekReportRepositoryImpl;
use crate::utils::TryFromRow;

impl YantekReportRepositoryImpl {
    /// Loads one report; with `for_update` the row stays locked until the transaction ends.
    pub(super) async fn find_by_id_impl(
        repo: &YantekReportRepositoryImpl,
        id: &str,
        for_update: bool,
    ) -> Result<Option<YantekReportModel>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = if for_update {
            "SELECT * FROM yantek_report WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT * FROM yantek_report WHERE id = $1"
        };
        let query = sqlx::query(sql).bind(id);

        let row = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_optional(&mut **transaction).await?
        };

        row.map(|row| YantekReportModel::try_from_row(&row)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::report::test_utils::create_test_yantek_report;
    use crate::test_helper::setup_test_context;
    use meter_report_db::repository::YantekReportRepository;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_by_id_missing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().yantek_report_repository;

        assert!(repo.find_by_id("YT2099019999").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_lock_by_id_returns_row() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().yantek_report_repository;

        repo.create(&create_test_yantek_report("YT2099010010")).await?;
        let locked = repo.lock_by_id("YT2099010010").await?;
        assert_eq!(locked.map(|r| r.id.to_string()), Some("YT2099010010".to_string()));
        Ok(())
    }
}
