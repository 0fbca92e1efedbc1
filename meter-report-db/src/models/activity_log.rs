use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use meter_report_api::ActivityType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::report_id::REPORT_ID_LEN;

/// # Documentation
/// Append-only ledger entry.
///
/// The ledger is both the audit trail and the visibility index: the reports
/// an agent filed are the subjects of that agent's `ReportCreated` entries.
/// Subject columns are plain ids, not foreign keys, so entries outlive the
/// reports they describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogModel {
    pub id: Uuid,

    pub activity_type: ActivityType,

    /// The authenticated user who caused the event
    pub actor_user_id: Uuid,

    pub subject_yantek_id: HeaplessString<REPORT_ID_LEN>,

    /// Set for completions performed through a connection report
    pub subject_connection_id: Option<HeaplessString<REPORT_ID_LEN>>,

    /// Set on `ReportDeleted` entries
    pub deleted_report_id: Option<HeaplessString<REPORT_ID_LEN>>,

    pub message: HeaplessString<255>,

    pub timestamp: DateTime<Utc>,
}
