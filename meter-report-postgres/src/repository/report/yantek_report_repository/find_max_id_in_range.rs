use super::repo_impl::YantekReportRepositoryImpl;

impl YantekReportRepositoryImpl {
    pub(super) async fn find_max_id_in_range_impl(
        repo: &YantekReportRepositoryImpl,
        lower: &str,
        upper: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM yantek_report
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

#[cfg(test)]
mod tests {
    use crate::repository::report::test_utils::create_test_yantek_report;
    use crate::test_helper::setup_test_context;
    use meter_report_db::repository::YantekReportRepository;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_max_id_stays_inside_partition() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().yantek_report_repository;

        for id in ["YT2099020003", "YT2099020011", "YT2099030001"] {
            repo.create(&create_test_yantek_report(id)).await?;
        }

        let max = repo.find_max_id_in_range("YT2099020000", "YT2099029999").await?;
        assert_eq!(max.as_deref(), Some("YT2099020011"));

        let none = repo.find_max_id_in_range("YT2099040000", "YT2099049999").await?;
        assert!(none.is_none());
        Ok(())
    }
}
