use meter_report_api::ReportError;
use meter_report_db::models::report_id::ReportIdError;
use meter_report_db::repository::error::DuplicateKeyError;
use std::fmt::Display;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to hand out the next report id.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error(transparent)]
    Id(#[from] ReportIdError),

    #[error("Failed to read the last issued id for {partition}: {source}")]
    Storage { partition: String, source: BoxError },

    #[error("Failed to lock id partition {partition}: {source}")]
    Lock { partition: String, source: BoxError },
}

impl From<AllocationError> for ReportError {
    fn from(err: AllocationError) -> Self {
        ReportError::Internal(err.to_string())
    }
}

/// Wraps a storage failure as [`ReportError::Internal`], keeping the operation context.
pub(crate) fn internal(context: impl Display, err: impl Display) -> ReportError {
    ReportError::Internal(format!("{context}: {err}"))
}

/// Outcome of one transactional attempt.
#[derive(Debug)]
pub(crate) enum TxError {
    /// The allocated id was taken concurrently; the attempt may be retried.
    IdCollision(DuplicateKeyError),
    Failed(ReportError),
}

impl From<ReportError> for TxError {
    fn from(err: ReportError) -> Self {
        TxError::Failed(err)
    }
}

impl From<AllocationError> for TxError {
    fn from(err: AllocationError) -> Self {
        TxError::Failed(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_report_db::models::report_id::{ReportPrefix, YearMonth};

    #[test]
    fn test_capacity_exceeded_is_internal() {
        let err: ReportError = AllocationError::from(ReportIdError::CapacityExceeded {
            prefix: ReportPrefix::Connection,
            year_month: YearMonth::new(2025, 3).unwrap(),
        })
        .into();
        assert_eq!(err, ReportError::Internal("Sequence limit exceeded for PS202503".to_string()));
    }
}
