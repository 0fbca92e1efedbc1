use super::repo_impl::ConnectionReportRepositoryImpl;

impl ConnectionReportRepositoryImpl {
    pub(super) async fn delete_by_yantek_report_id_impl(
        repo: &ConnectionReportRepositoryImpl,
        yantek_report_id: &str,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query("DELETE FROM connection_report WHERE yantek_report_id = $1")
            .bind(yantek_report_id);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        let result = query.execute(&mut **transaction).await?;

        Ok(usize::try_from(result.rows_affected())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::report::test_utils::{create_test_connection_report, create_test_yantek_report};
    use crate::test_helper::setup_test_context;
    use meter_report_db::repository::{ConnectionReportRepository, YantekReportRepository};

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_delete_children_then_parent() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let yantek_repo = &ctx.report_repos().yantek_report_repository;
        let connection_repo = &ctx.report_repos().connection_report_repository;

        yantek_repo.create(&create_test_yantek_report("YT2099130001")).await?;
        connection_repo.create(&create_test_connection_report("PS2099130001", "YT2099130001")).await?;

        assert_eq!(connection_repo.delete_by_yantek_report_id("YT2099130001").await?, 1);
        assert!(yantek_repo.delete("YT2099130001").await?);
        assert!(connection_repo.find_by_id("PS2099130001").await?.is_none());
        Ok(())
    }
}
