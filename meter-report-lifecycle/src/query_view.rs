//! Role-scoped read projections.
//!
//! Visibility of a field agent's reports is derived from the ledger: an agent
//! sees the reports it created (Yantek agents) or completed (connection
//! agents). Ids are resolved first, then the listing filters on them and only
//! afterwards cuts the page, so totals always match what the caller can see.

use chrono::{DateTime, Local, TimeZone, Utc};
use meter_report_api::{ActivityType, AuthContext, PaginationQuery, ReportError, ReportResult, ReportStatus, UserRole};
use meter_report_db::models::activity_log::ActivityLogModel;
use meter_report_db::models::connection_report::{ConnectionReportItem, ConnectionReportModel, YantekHistoryItem};
use meter_report_db::models::report_id::YearMonth;
use meter_report_db::models::yantek_report::YantekReportModel;
use meter_report_db::repository::pagination::{Page, PageRequest, Paginated};
use meter_report_db::repository::unit_of_work::{UnitOfWork, UnitOfWorkSession};
use meter_report_db::repository::{ConnectionReportFilter, YantekReportFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::internal;
use crate::ledger::ActivityLedger;
use crate::lifecycle::not_found;
use crate::session::abandon;

/// Report counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub new: usize,
    pub in_progress: usize,
    pub done: usize,
    pub created_this_month: usize,
    pub created_last_month: usize,
}

pub struct ReportQueryView {
    uow: Arc<dyn UnitOfWork>,
    ledger: Arc<ActivityLedger>,
}

fn page_request(query: &PaginationQuery) -> PageRequest {
    PageRequest::for_page(query.limit(), query.page())
}

/// Start of `month` in the server's local time zone, as UTC.
fn month_start(month: YearMonth) -> DateTime<Utc> {
    let midnight = month.first_day().and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

impl ReportQueryView {
    pub fn new(uow: Arc<dyn UnitOfWork>, ledger: Arc<ActivityLedger>) -> Self {
        Self { uow, ledger }
    }

    async fn begin(&self) -> ReportResult<Box<dyn UnitOfWorkSession>> {
        self.uow
            .begin()
            .await
            .map_err(|e| internal("Failed to open a read session", e))
    }

    /// Ends a read-only session and passes `result` through.
    async fn finish<T>(session: Box<dyn UnitOfWorkSession>, result: ReportResult<T>) -> ReportResult<T> {
        abandon(session, "reading reports").await;
        result
    }

    /// Ledger-derived restriction for Yantek listings; `None` means unrestricted.
    async fn yantek_scope(&self, auth: &AuthContext) -> ReportResult<Option<Vec<String>>> {
        match auth.role {
            UserRole::YantekAgent => Ok(Some(
                self.ledger
                    .find_subjects_by_actor(ActivityType::ReportCreated, auth.actor_id)
                    .await?,
            )),
            UserRole::Admin | UserRole::ConnectionAgent => Ok(None),
        }
    }

    pub async fn find_one(&self, id: &str) -> ReportResult<YantekReportModel> {
        let session = self.begin().await?;
        let result = session
            .yantek_reports()
            .find_by_id(id)
            .await
            .map_err(|e| internal(format!("Failed to load Yantek report {id}"), e))
            .and_then(|found| found.ok_or_else(|| not_found(id)));
        Self::finish(session, result).await
    }

    /// A Yantek report together with its connection report, if completed.
    pub async fn find_with_connection(&self, id: &str) -> ReportResult<YantekHistoryItem> {
        let session = self.begin().await?;
        let result = async {
            let report = session
                .yantek_reports()
                .find_by_id(id)
                .await
                .map_err(|e| internal(format!("Failed to load Yantek report {id}"), e))?
                .ok_or_else(|| not_found(id))?;
            let connection_report = session
                .connection_reports()
                .find_by_yantek_report_id(id)
                .await
                .map_err(|e| internal(format!("Failed to load the connection report of {id}"), e))?;
            Ok::<_, ReportError>(YantekHistoryItem {
                report,
                connection_report,
            })
        }
        .await;
        Self::finish(session, result).await
    }

    /// Work queue: `NEW` and `IN_PROGRESS`, or the single status named by the query.
    pub async fn find_active(
        &self,
        query: &PaginationQuery,
        auth: &AuthContext,
    ) -> ReportResult<Paginated<YantekReportModel>> {
        query.validate()?;
        let statuses = match query.status {
            Some(status) => vec![status],
            None => ReportStatus::ACTIVE.to_vec(),
        };
        let mut filter = YantekReportFilter {
            statuses,
            ..Default::default()
        };
        if let Some(ids) = self.yantek_scope(auth).await? {
            filter = filter.restricted_to(ids);
        }

        let session = self.begin().await?;
        let result = session
            .yantek_reports()
            .find_page(&filter, page_request(query))
            .await
            .map(Paginated::from)
            .map_err(|e| internal("Failed to list active reports", e));
        Self::finish(session, result).await
    }

    /// Completed reports with their connection reports.
    pub async fn find_history(
        &self,
        query: &PaginationQuery,
        auth: &AuthContext,
    ) -> ReportResult<Paginated<YantekHistoryItem>> {
        query.validate()?;
        let mut filter = YantekReportFilter {
            has_connection_report: Some(true),
            ..YantekReportFilter::with_statuses(&[ReportStatus::Done])
        };
        if let Some(ids) = self.yantek_scope(auth).await? {
            filter = filter.restricted_to(ids);
        }
        self.history_page(filter, page_request(query)).await
    }

    /// Completed reports filed under `technician_name`.
    pub async fn find_yantek_history_for_technician(
        &self,
        query: &PaginationQuery,
        technician_name: &str,
    ) -> ReportResult<Paginated<YantekHistoryItem>> {
        query.validate()?;
        let filter = YantekReportFilter {
            technician_name: Some(technician_name.to_string()),
            ..YantekReportFilter::with_statuses(&[ReportStatus::Done])
        };
        self.history_page(filter, page_request(query)).await
    }

    async fn history_page(
        &self,
        filter: YantekReportFilter,
        page: PageRequest,
    ) -> ReportResult<Paginated<YantekHistoryItem>> {
        let session = self.begin().await?;
        let result = async {
            let reports = session
                .yantek_reports()
                .find_page(&filter, page)
                .await
                .map_err(|e| internal("Failed to list report history", e))?;
            let ids: Vec<String> = reports.items.iter().map(|r| r.id.to_string()).collect();
            let mut connections: HashMap<String, ConnectionReportModel> = session
                .connection_reports()
                .find_by_yantek_report_ids(&ids)
                .await
                .map_err(|e| internal("Failed to load connection reports", e))?
                .into_iter()
                .map(|c| (c.yantek_report_id.to_string(), c))
                .collect();

            Ok::<Paginated<_>, ReportError>(reports
                .map(|report| YantekHistoryItem {
                    connection_report: connections.remove(report.id.as_str()),
                    report,
                })
                .into())
        }
        .await;
        Self::finish(session, result).await
    }

    /// Connection reports with their parents. Connection agents see the ones they completed.
    pub async fn find_connection_reports(
        &self,
        query: &PaginationQuery,
        auth: &AuthContext,
    ) -> ReportResult<Paginated<ConnectionReportItem>> {
        query.validate()?;
        let filter = match auth.role {
            UserRole::ConnectionAgent => ConnectionReportFilter::restricted_to(
                self.ledger
                    .find_connection_subjects_by_actor(ActivityType::ReportCompleted, auth.actor_id)
                    .await?,
            ),
            UserRole::Admin | UserRole::YantekAgent => ConnectionReportFilter::default(),
        };
        self.connection_page(filter, page_request(query)).await
    }

    /// Connection reports referenced by `actor_id`'s completions, whatever its role.
    pub async fn find_connection_history_for_agent(
        &self,
        query: &PaginationQuery,
        actor_id: Uuid,
    ) -> ReportResult<Paginated<ConnectionReportItem>> {
        query.validate()?;
        let ids = self
            .ledger
            .find_connection_subjects_by_actor(ActivityType::ReportCompleted, actor_id)
            .await?;
        self.connection_page(ConnectionReportFilter::restricted_to(ids), page_request(query))
            .await
    }

    async fn connection_page(
        &self,
        filter: ConnectionReportFilter,
        page: PageRequest,
    ) -> ReportResult<Paginated<ConnectionReportItem>> {
        let session = self.begin().await?;
        let result = async {
            let connections: Page<ConnectionReportModel> = session
                .connection_reports()
                .find_page(&filter, page)
                .await
                .map_err(|e| internal("Failed to list connection reports", e))?;

            let mut parents = Vec::with_capacity(connections.items.len());
            for connection in &connections.items {
                let parent = session
                    .yantek_reports()
                    .find_by_id(&connection.yantek_report_id)
                    .await
                    .map_err(|e| internal(format!("Failed to load Yantek report {}", connection.yantek_report_id), e))?;
                parents.push(parent);
            }

            let mut parents = parents.into_iter();
            Ok::<Paginated<_>, ReportError>(connections
                .map(|report| ConnectionReportItem {
                    report,
                    yantek_report: parents.next().flatten(),
                })
                .into())
        }
        .await;
        Self::finish(session, result).await
    }

    /// Counts per status plus creations in the current and previous month.
    pub async fn summary(&self) -> ReportResult<ReportSummary> {
        let this_month = YearMonth::current();
        let (last_start, this_start, next_start) = (
            month_start(this_month.previous()),
            month_start(this_month),
            month_start(this_month.next()),
        );

        let session = self.begin().await?;
        let reports = session.yantek_reports();
        let result = async {
            let count = |statuses: &'static [ReportStatus]| {
                let reports = reports.clone();
                async move {
                    reports
                        .count(&YantekReportFilter::with_statuses(statuses))
                        .await
                        .map_err(|e| internal("Failed to count reports", e))
                }
            };
            let created_between = |from: DateTime<Utc>, to: DateTime<Utc>| {
                let reports = reports.clone();
                async move {
                    reports
                        .count_created_between(from, to)
                        .await
                        .map_err(|e| internal("Failed to count reports by month", e))
                }
            };

            Ok::<_, ReportError>(ReportSummary {
                total: count(&[]).await?,
                new: count(&[ReportStatus::New]).await?,
                in_progress: count(&[ReportStatus::InProgress]).await?,
                done: count(&[ReportStatus::Done]).await?,
                created_this_month: created_between(this_start, next_start).await?,
                created_last_month: created_between(last_start, this_start).await?,
            })
        }
        .await;
        Self::finish(session, result).await
    }

    /// Latest ledger entries, newest first. `None` selects the default feed types.
    pub async fn recent_activity(
        &self,
        limit: usize,
        types: Option<&[ActivityType]>,
    ) -> ReportResult<Vec<ActivityLogModel>> {
        if limit == 0 {
            return Err(ReportError::ValidationFailed("limit must be at least 1".to_string()));
        }
        self.ledger.recent(limit, types).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerEntry;
    use crate::test_utils::{complete_request, connection_attachments, yantek_attachments, yantek_request, yantek_model, TestEngine};
    use chrono::Duration;

    async fn create_as(t: &TestEngine, auth: &AuthContext) -> YantekReportModel {
        t.engine
            .lifecycle()
            .create_yantek_report(yantek_request(), yantek_attachments(), auth)
            .await
            .unwrap()
            .data
    }

    fn ids<T>(page: &Paginated<T>, id: impl Fn(&T) -> &str) -> Vec<String> {
        let mut ids: Vec<String> = page.data.iter().map(|item| id(item).to_string()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_agent_sees_only_own_reports() {
        let t = TestEngine::new();
        let agent = AuthContext::yantek_agent(Uuid::new_v4());
        let other = AuthContext::yantek_agent(Uuid::new_v4());

        let a = create_as(&t, &agent).await;
        let b = create_as(&t, &other).await;
        let c = create_as(&t, &agent).await;

        let view = t.engine.query_view();
        let query = PaginationQuery::default();
        let own = view.find_active(&query, &agent).await.unwrap();
        assert_eq!(ids(&own, |r| r.id.as_str()), vec![a.id.to_string(), c.id.to_string()]);
        assert_eq!(own.meta.total_items, 2);

        let all = view
            .find_active(&query, &AuthContext::admin(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(
            ids(&all, |r| r.id.as_str()),
            vec![a.id.to_string(), b.id.to_string(), c.id.to_string()]
        );
    }

    #[tokio::test]
    async fn test_filter_then_page() {
        let t = TestEngine::new();
        let agent = AuthContext::yantek_agent(Uuid::new_v4());
        let other = AuthContext::yantek_agent(Uuid::new_v4());
        for i in 0..5 {
            create_as(&t, if i % 2 == 0 { &agent } else { &other }).await;
        }

        let page = t
            .engine
            .query_view()
            .find_active(&PaginationQuery::new(2, 2), &agent)
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total_items, 3);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(page.meta.current_page, 2);
    }

    #[tokio::test]
    async fn test_status_query_overrides_active_set() {
        let t = TestEngine::new();
        let mut done = yantek_model("YT2025010001");
        done.status = ReportStatus::Done;
        t.uow.seed_yantek(done).await;
        t.uow.seed_yantek(yantek_model("YT2025010002")).await;

        let query = PaginationQuery {
            status: Some(ReportStatus::Done),
            ..PaginationQuery::default()
        };
        let page = t
            .engine
            .query_view()
            .find_active(&query, &AuthContext::admin(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(ids(&page, |r| r.id.as_str()), vec!["YT2025010001".to_string()]);
    }

    #[tokio::test]
    async fn test_history_joins_connection_reports() {
        let t = TestEngine::new();
        let admin = AuthContext::admin(Uuid::new_v4());
        let completer = AuthContext::connection_agent(Uuid::new_v4());

        let completed = create_as(&t, &admin).await;
        let open = create_as(&t, &admin).await;
        let connection = t
            .engine
            .lifecycle()
            .complete_report(&completed.id, complete_request(), connection_attachments(), &completer)
            .await
            .unwrap()
            .data;

        // DONE without a connection report stays out of the history.
        t.engine
            .lifecycle()
            .update_status(&open.id, meter_report_api::UpdateStatusRequest::status_only(ReportStatus::Done), &admin)
            .await
            .unwrap();

        let view = t.engine.query_view();
        let history = view.find_history(&PaginationQuery::default(), &admin).await.unwrap();
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.data[0].report.id, completed.id);
        assert_eq!(history.data[0].connection_report.as_ref().map(|c| &c.id), Some(&connection.id));

        let by_technician = view
            .find_yantek_history_for_technician(&PaginationQuery::default(), "Budi")
            .await
            .unwrap();
        assert_eq!(by_technician.meta.total_items, 2);

        let pair = view.find_with_connection(&completed.id).await.unwrap();
        assert_eq!(pair.connection_report.map(|c| c.id), Some(connection.id));
    }

    #[tokio::test]
    async fn test_connection_listings_are_scoped_by_completions() {
        let t = TestEngine::new();
        let admin = AuthContext::admin(Uuid::new_v4());
        let agent = AuthContext::connection_agent(Uuid::new_v4());
        let other = AuthContext::connection_agent(Uuid::new_v4());

        let first = create_as(&t, &admin).await;
        let second = create_as(&t, &admin).await;
        let mine = t
            .engine
            .lifecycle()
            .complete_report(&first.id, complete_request(), connection_attachments(), &agent)
            .await
            .unwrap()
            .data;
        t.engine
            .lifecycle()
            .complete_report(&second.id, complete_request(), connection_attachments(), &other)
            .await
            .unwrap();

        let view = t.engine.query_view();
        let scoped = view.find_connection_reports(&PaginationQuery::default(), &agent).await.unwrap();
        assert_eq!(ids(&scoped, |c| c.report.id.as_str()), vec![mine.id.to_string()]);
        assert_eq!(scoped.data[0].yantek_report.as_ref().map(|y| &y.id), Some(&first.id));

        let all = view.find_connection_reports(&PaginationQuery::default(), &admin).await.unwrap();
        assert_eq!(all.meta.total_items, 2);

        let history = view
            .find_connection_history_for_agent(&PaginationQuery::default(), other.actor_id)
            .await
            .unwrap();
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.data[0].report.yantek_report_id, second.id);
    }

    #[tokio::test]
    async fn test_history_is_scoped_to_the_agents_creations() {
        let t = TestEngine::new();
        let agent = AuthContext::yantek_agent(Uuid::new_v4());
        let other = AuthContext::yantek_agent(Uuid::new_v4());
        let completer = AuthContext::connection_agent(Uuid::new_v4());

        let a = create_as(&t, &agent).await;
        let b = create_as(&t, &other).await;
        let c = create_as(&t, &agent).await;
        create_as(&t, &agent).await;
        for report in [&a, &b, &c] {
            t.engine
                .lifecycle()
                .complete_report(&report.id, complete_request(), connection_attachments(), &completer)
                .await
                .unwrap();
        }

        let view = t.engine.query_view();
        let first_page = view.find_history(&PaginationQuery::new(1, 1), &agent).await.unwrap();
        assert_eq!(first_page.data.len(), 1);
        assert_eq!(first_page.meta.total_items, 2);
        assert_eq!(first_page.meta.total_pages, 2);

        let own = view.find_history(&PaginationQuery::default(), &agent).await.unwrap();
        assert_eq!(
            ids(&own, |item| item.report.id.as_str()),
            vec![a.id.to_string(), c.id.to_string()]
        );
        assert!(own.data.iter().all(|item| item.connection_report.is_some()));

        for unrestricted in [AuthContext::admin(Uuid::new_v4()), completer] {
            let all = view.find_history(&PaginationQuery::default(), &unrestricted).await.unwrap();
            assert_eq!(all.meta.total_items, 3, "{:?} sees every completed report", unrestricted.role);
        }
    }

    #[tokio::test]
    async fn test_connection_reports_are_unrestricted_for_admin_and_yantek_agents() {
        let t = TestEngine::new();
        let agent = AuthContext::yantek_agent(Uuid::new_v4());
        let admin = AuthContext::admin(Uuid::new_v4());
        let completers = [
            AuthContext::connection_agent(Uuid::new_v4()),
            AuthContext::connection_agent(Uuid::new_v4()),
            AuthContext::connection_agent(Uuid::new_v4()),
        ];
        for completer in &completers {
            let report = create_as(&t, &admin).await;
            t.engine
                .lifecycle()
                .complete_report(&report.id, complete_request(), connection_attachments(), completer)
                .await
                .unwrap();
        }

        let view = t.engine.query_view();
        for caller in [&agent, &admin] {
            let page = view.find_connection_reports(&PaginationQuery::new(2, 2), caller).await.unwrap();
            assert_eq!(page.data.len(), 1, "{:?}", caller.role);
            assert_eq!(page.meta.total_items, 3, "{:?}", caller.role);
            assert_eq!(page.meta.current_page, 2);
        }

        let scoped = view
            .find_connection_reports(&PaginationQuery::default(), &completers[1])
            .await
            .unwrap();
        assert_eq!(scoped.meta.total_items, 1);
    }

    #[tokio::test]
    async fn test_find_one_unknown_is_not_found() {
        let t = TestEngine::new();
        let err = t.engine.query_view().find_one("YT2025010009").await.unwrap_err();
        assert_eq!(err, ReportError::NotFound("Yantek report YT2025010009 not found".to_string()));
    }

    #[tokio::test]
    async fn test_summary_counts_statuses_and_months() {
        let t = TestEngine::new();
        let now = Utc::now();
        let last_month = month_start(YearMonth::current()) - Duration::days(1);

        let mut in_progress = yantek_model("YT2025010001");
        in_progress.status = ReportStatus::InProgress;
        in_progress.created_at = now;
        let mut done = yantek_model("YT2025010002");
        done.status = ReportStatus::Done;
        done.created_at = last_month;
        let mut fresh = yantek_model("YT2025010003");
        fresh.created_at = now;
        for report in [in_progress, done, fresh] {
            t.uow.seed_yantek(report).await;
        }

        let summary = t.engine.query_view().summary().await.unwrap();
        assert_eq!(
            summary,
            ReportSummary {
                total: 3,
                new: 1,
                in_progress: 1,
                done: 1,
                created_this_month: 2,
                created_last_month: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_recent_activity() {
        let t = TestEngine::new();
        let actor = Uuid::new_v4();
        t.engine
            .ledger()
            .append(LedgerEntry::new(ActivityType::ReportCreated, actor, "YT2025010001", "created"))
            .await
            .unwrap();

        let recent = t.engine.query_view().recent_activity(5, None).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert!(t.engine.query_view().recent_activity(0, None).await.is_err());
    }
}
