//! Ending unit-of-work sessions.

use meter_report_api::ReportResult;
use meter_report_db::repository::unit_of_work::UnitOfWorkSession;
use tracing::warn;

use crate::error::internal;

/// Ends a session without publishing its writes. A failed rollback is logged, not returned.
pub(crate) async fn abandon(session: Box<dyn UnitOfWorkSession>, operation: &str) {
    if let Err(err) = session.rollback().await {
        warn!(operation, error = %err, "rollback failed");
    }
}

pub(crate) async fn commit(session: Box<dyn UnitOfWorkSession>, operation: &str) -> ReportResult<()> {
    session
        .commit()
        .await
        .map_err(|e| internal(format!("Failed to commit {operation}"), e))
}
