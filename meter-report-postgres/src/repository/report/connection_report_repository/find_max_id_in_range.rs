use super::repo_impl::ConnectionReportRepositoryImpl;

impl ConnectionReportRepositoryImpl {
    pub(super) async fn find_max_id_in_range_impl(
        repo: &ConnectionReportRepositoryImpl,
        lower: &str,
        upper: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM connection_report
            WHERE id >= $1 AND id <= $2
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(lower)
        .bind(upper);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        Ok(query.fetch_optional(&mut **transaction).await?)
    }
}
