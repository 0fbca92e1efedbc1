use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::repository::connection_report_repository::ConnectionReportFilter;
use meter_report_db::repository::pagination::{Page, PageRequest};

use super::repo_impl::ConnectionReportRepositoryImpl;
use crate::utils::count_to_usize;

impl ConnectionReportRepositoryImpl {
    pub(super) async fn find_page_impl(
        repo: &ConnectionReportRepositoryImpl,
        filter: &ConnectionReportFilter,
        page: PageRequest,
    ) -> Result<Page<ConnectionReportModel>, Box<dyn std::error::Error + Send + Sync>> {
        if matches!(&filter.ids, Some(ids) if ids.is_empty()) {
            return Ok(Page::empty(page));
        }

        let count_query = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM connection_report WHERE ($1::text[] IS NULL OR id = ANY($1))",
        )
        .bind(filter.ids.clone());
        let total = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            count_query.fetch_one(&mut **transaction).await?
        };

        let query = sqlx::query(
            r#"
            SELECT * FROM connection_report
            WHERE ($1::text[] IS NULL OR id = ANY($1))
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.ids.clone())
        .bind(i64::try_from(page.limit)?)
        .bind(i64::try_from(page.offset)?);
        let items = repo.fetch_models(query).await?;

        Ok(Page::new(items, count_to_usize(total)?, page.limit, page.offset))
    }
}
