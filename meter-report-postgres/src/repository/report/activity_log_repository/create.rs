use meter_report_db::models::activity_log::ActivityLogModel;

use super::repo_impl::ActivityLogRepositoryImpl;

impl ActivityLogRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &ActivityLogRepositoryImpl,
        entry: &ActivityLogModel,
    ) -> Result<ActivityLogModel, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query(
            r#"
            INSERT INTO activity_log (
                id, activity_type, actor_user_id, subject_yantek_id,
                subject_connection_id, deleted_report_id, message, timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.activity_type)
        .bind(entry.actor_user_id)
        .bind(entry.subject_yantek_id.as_str())
        .bind(entry.subject_connection_id.as_ref().map(|s| s.as_str()))
        .bind(entry.deleted_report_id.as_ref().map(|s| s.as_str()))
        .bind(entry.message.as_str())
        .bind(entry.timestamp);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
        query.execute(&mut **transaction).await?;

        Ok(entry.clone())
    }
}
