use meter_report_api::ActivityType;
use meter_report_db::models::activity_log::ActivityLogModel;
use uuid::Uuid;

use super::repo_impl::ActivityLogRepositoryImpl;
use crate::utils::TryFromRow;

impl ActivityLogRepositoryImpl {
    pub(super) async fn find_by_type_and_actor_impl(
        repo: &ActivityLogRepositoryImpl,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> Result<Vec<ActivityLogModel>, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query(
            r#"
            SELECT * FROM activity_log
            WHERE activity_type = $1 AND actor_user_id = $2
            ORDER BY timestamp, id
            "#,
        )
        .bind(activity_type)
        .bind(actor_user_id);

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
    use meter_report_api::ActivityType;
    use meter_report_db::repository::ActivityLogRepository;
    use uuid::Uuid;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_by_type_and_actor() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = &ctx.report_repos().activity_log_repository;

        let actor = Uuid::new_v4();
        let mut mine = create_test_activity_log(ActivityType::ReportCreated, "YT2099170001");
        mine.actor_user_id = actor;
        repo.create(&mine).await?;
        let mut other_type = create_test_activity_log(ActivityType::ReportProcessed, "YT2099170001");
        other_type.actor_user_id = actor;
        repo.create(&other_type).await?;
        repo.create(&create_test_activity_log(ActivityType::ReportCreated, "YT2099170002")).await?;

        let found = repo.find_by_type_and_actor(ActivityType::ReportCreated, actor).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subject_yantek_id.as_str(), "YT2099170001");
        Ok(())
    }
}
