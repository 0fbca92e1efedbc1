use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::pagination::{Page, PageRequest};
use meter_report_db::repository::yantek_report_repository::YantekReportFilter;

use super::repo_impl::{bind_filter, YantekReportRepositoryImpl, FILTER_CLAUSE};
use crate::utils::{count_to_usize, TryFromRow};

impl YantekReportRepositoryImpl {
    pub(super) async fn find_page_impl(
        repo: &YantekReportRepositoryImpl,
        filter: &YantekReportFilter,
        page: PageRequest,
    ) -> Result<Page<YantekReportModel>, Box<dyn std::error::Error + Send + Sync>> {
        if matches!(&filter.ids, Some(ids) if ids.is_empty()) {
            return Ok(Page::empty(page));
        }

        let total = Self::count_impl(repo, filter).await?;

        let sql = format!(
            "SELECT y.* FROM yantek_report y WHERE {FILTER_CLAUSE} \
             ORDER BY y.created_at DESC, y.id DESC LIMIT $5 OFFSET $6"
        );
        let limit = i64::try_from(page.limit)?;
        let offset = i64::try_from(page.offset)?;
        let query = bind_filter(sqlx::query(&sql), filter).bind(limit).bind(offset);

        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_all(&mut **transaction).await?
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(YantekReportModel::try_from_row(&row)?);
        }
        Ok(Page::new(items, total, page.limit, page.offset))
    }

    pub(super) async fn count_impl(
        repo: &YantekReportRepositoryImpl,
        filter: &YantekReportFilter,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        if matches!(&filter.ids, Some(ids) if ids.is_empty()) {
            return Ok(0);
        }

        let sql = format!("SELECT COUNT(*) FROM yantek_report y WHERE {FILTER_CLAUSE}");
        let query = bind_filter(sqlx::query(&sql), filter);

        let row = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.fetch_one(&mut **transaction).await?
        };

        let count: i64 = sqlx::Row::try_get(&row, 0)?;
        count_to_usize(count)
    }
}
