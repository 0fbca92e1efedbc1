use meter_report_api::ActivityType;
use meter_report_db::models::activity_log::ActivityLogModel;

use super::repo_impl::ActivityLogRepositoryImpl;
use crate::utils::TryFromRow;

impl ActivityLogRepositoryImpl {
    pub(super) async fn find_recent_impl(
        repo: &ActivityLogRepositoryImpl,
        limit: usize,
        types: &[ActivityType],
    ) -> Result<Vec<ActivityLogModel>, Box<dyn std::error::Error + Send + Sync>> {
        let type_names: Vec<String> = types.iter().map(|t| t.as_str().to_string()).collect();
        let query = sqlx::query(
            r#"
            SELECT * FROM activity_log
            WHERE cardinality($1::text[]) = 0 OR activity_type::text = ANY($1)
            ORDER BY timestamp DESC, id
            LIMIT $2
            "#,
        )
        .bind(type_names)
        .bind(i64::try_from(limit)?);

        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_all(&mut **transaction).await?
        };

        rows.iter().map(ActivityLogModel::try_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::report::test_utils::create_test_activity_log;
    use crate::test_helper::setup_test_context;
    use chrono::{Duration, Utc};
    use meter_report_api::ActivityType;
    use meter_report_db::repository::ActivityLogRepository;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_recent_filters_types_newest_first() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().activity_log_repository;

        let future = Utc::now() + Duration::days(3650);
        let mut created = create_test_activity_log(ActivityType::ReportCreated, "YT2099160001");
        created.timestamp = future;
        let mut updated = create_test_activity_log(ActivityType::ReportUpdated, "YT2099160001");
        updated.timestamp = future + Duration::seconds(1);
        let mut deleted = create_test_activity_log(ActivityType::ReportDeleted, "YT2099160001");
        deleted.timestamp = future + Duration::seconds(2);
        for entry in [&created, &updated, &deleted] {
            repo.create(entry).await?;
        }

        let recent = repo.find_recent(2, &ActivityType::RECENT_DEFAULT).await?;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, deleted.id);
        assert_eq!(recent[1].id, created.id);
        Ok(())
    }
}
