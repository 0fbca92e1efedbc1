use meter_report_db::models::report_id::{ReportId, ReportPrefix, YearMonth};
use meter_report_db::repository::unit_of_work::UnitOfWorkSession;
use tracing::debug;

use crate::error::AllocationError;

/// Hands out `<prefix><YYYYMM><seq>` ids.
///
/// Allocation reads the greatest id of the month partition inside the caller's
/// transaction, so the id and the row that uses it commit or vanish together.
/// The unique key on insert remains the final guard against a concurrent
/// allocator that read the same maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIdAllocator;

impl SequentialIdAllocator {
    pub fn new() -> Self {
        Self
    }

    pub async fn next(
        &self,
        session: &dyn UnitOfWorkSession,
        prefix: ReportPrefix,
        year_month: YearMonth,
    ) -> Result<ReportId, AllocationError> {
        let partition = format!("{prefix}{year_month}");
        session
            .lock_id_partition(&partition)
            .await
            .map_err(|source| AllocationError::Lock {
                partition: partition.clone(),
                source,
            })?;

        let (lower, upper) = ReportId::partition_bounds(prefix, year_month);
        let last_issued = match prefix {
            ReportPrefix::Yantek => session.yantek_reports().find_max_id_in_range(&lower, &upper).await,
            ReportPrefix::Connection => {
                session.connection_reports().find_max_id_in_range(&lower, &upper).await
            }
        }
        .map_err(|source| AllocationError::Storage {
            partition: partition.clone(),
            source,
        })?;

        let id = ReportId::next_after(prefix, year_month, last_issued.as_deref())?;
        debug!(%id, last_issued = last_issued.as_deref().unwrap_or("-"), "allocated report id");
        Ok(id)
    }
}
