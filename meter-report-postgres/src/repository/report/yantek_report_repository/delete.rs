use super::repo_impl::YantekReportRepositoryImpl;

impl YantekReportRepositoryImpl {
    pub(super) async fn delete_impl(
        repo: &YantekReportRepositoryImpl,
        id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query("DELETE FROM yantek_report WHERE id = $1").bind(id);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        let result = query.execute(&mut **transaction).await?;

        Ok(result.rows_affected() > 0)
    }
}
