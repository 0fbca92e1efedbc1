use chrono::{DateTime, Utc};

use super::repo_impl::YantekReportRepositoryImpl;
use crate::utils::count_to_usize;

impl YantekReportRepositoryImpl {
    pub(super) async fn count_created_between_impl(
        repo: &YantekReportRepositoryImpl,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let query = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM yantek_report WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(from)
        .bind(to);

        let count = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_one(&mut **transaction).await?
        };
        count_to_usize(count)
    }
}
