use chrono::Utc;
use heapless::String as HeaplessString;
use meter_report_api::{ActivityType, ReportError, ReportResult};
use meter_report_db::models::activity_log::ActivityLogModel;
use meter_report_db::repository::unit_of_work::UnitOfWork;
use meter_report_db::utils::{bounded, bounded_opt};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{internal, BoxError};
use crate::session::abandon;

const MESSAGE_LEN: usize = 255;

/// Event to append to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub activity_type: ActivityType,
    pub actor_user_id: Uuid,
    pub subject_yantek_id: String,
    pub subject_connection_id: Option<String>,
    pub deleted_report_id: Option<String>,
    pub message: String,
}

impl LedgerEntry {
    pub fn new(
        activity_type: ActivityType,
        actor_user_id: Uuid,
        subject_yantek_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            activity_type,
            actor_user_id,
            subject_yantek_id: subject_yantek_id.into(),
            subject_connection_id: None,
            deleted_report_id: None,
            message: message.into(),
        }
    }

    pub fn with_connection(mut self, connection_id: impl Into<String>) -> Self {
        self.subject_connection_id = Some(connection_id.into());
        self
    }

    pub fn with_deleted_report(mut self, report_id: impl Into<String>) -> Self {
        self.deleted_report_id = Some(report_id.into());
        self
    }

    fn into_model(self) -> ReportResult<ActivityLogModel> {
        let invalid = |e: meter_report_db::utils::BoundedStringError| ReportError::ValidationFailed(e.to_string());
        Ok(ActivityLogModel {
            id: Uuid::new_v4(),
            activity_type: self.activity_type,
            actor_user_id: self.actor_user_id,
            subject_yantek_id: bounded(&self.subject_yantek_id, "subject_yantek_id").map_err(invalid)?,
            subject_connection_id: bounded_opt(self.subject_connection_id.as_deref(), "subject_connection_id")
                .map_err(invalid)?,
            deleted_report_id: bounded_opt(self.deleted_report_id.as_deref(), "deleted_report_id").map_err(invalid)?,
            message: truncated(&self.message),
            timestamp: Utc::now(),
        })
    }
}

/// Longest prefix of `message` that fits the message column, cut on a char boundary.
fn truncated(message: &str) -> HeaplessString<MESSAGE_LEN> {
    let mut out = HeaplessString::new();
    for ch in message.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Append-only activity log, written in its own transactions.
///
/// Entries are recorded after the primary transaction has committed; a
/// ledger failure never undoes or fails the operation it describes.
pub struct ActivityLedger {
    uow: Arc<dyn UnitOfWork>,
    append_attempts: usize,
}

impl ActivityLedger {
    pub fn new(uow: Arc<dyn UnitOfWork>, append_attempts: usize) -> Self {
        Self {
            uow,
            append_attempts: append_attempts.max(1),
        }
    }

    /// Appends `entry`, retrying transient failures up to the configured attempts.
    pub async fn append(&self, entry: LedgerEntry) -> ReportResult<ActivityLogModel> {
        let model = entry.into_model()?;
        let mut last_error = None;
        for attempt in 1..=self.append_attempts {
            match self.try_append(&model).await {
                Ok(stored) => return Ok(stored),
                Err(err) => {
                    warn!(attempt, activity_type = %model.activity_type, subject = %model.subject_yantek_id, error = %err, "ledger append failed");
                    last_error = Some(err);
                }
            }
        }
        let err = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(ReportError::Internal(format!(
            "Failed to record {} for {}: {err}",
            model.activity_type, model.subject_yantek_id
        )))
    }

    async fn try_append(&self, model: &ActivityLogModel) -> Result<ActivityLogModel, BoxError> {
        let session = self.uow.begin().await?;
        let stored = session.activity_logs().create(model).await?;
        session.commit().await?;
        Ok(stored)
    }

    /// Best-effort [`append`](Self::append): failures are logged and swallowed.
    pub async fn record(&self, entry: LedgerEntry) -> Option<ActivityLogModel> {
        let activity_type = entry.activity_type;
        let subject = entry.subject_yantek_id.clone();
        match self.append(entry).await {
            Ok(stored) => Some(stored),
            Err(err) => {
                error!(%activity_type, subject = %subject, error = %err, "activity not recorded");
                None
            }
        }
    }

    /// Latest entries, newest first. `None` selects the default feed types.
    pub async fn recent(&self, limit: usize, types: Option<&[ActivityType]>) -> ReportResult<Vec<ActivityLogModel>> {
        let types = types.unwrap_or(&ActivityType::RECENT_DEFAULT);
        let session = self.uow.begin().await.map_err(|e| internal("Failed to read activity", e))?;
        let entries = session.activity_logs().find_recent(limit, types).await;
        abandon(session, "reading recent activity").await;
        entries.map_err(|e| internal("Failed to read activity", e))
    }

    /// Ids of the Yantek reports `actor_user_id` is the subject-actor of, first occurrence order.
    pub async fn find_subjects_by_actor(
        &self,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> ReportResult<Vec<String>> {
        let entries = self.entries_by_actor(activity_type, actor_user_id).await?;
        Ok(dedup(entries.iter().map(|e| e.subject_yantek_id.to_string())))
    }

    /// Ids of the connection reports referenced by the actor's entries of `activity_type`.
    pub async fn find_connection_subjects_by_actor(
        &self,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> ReportResult<Vec<String>> {
        let entries = self.entries_by_actor(activity_type, actor_user_id).await?;
        Ok(dedup(
            entries
                .iter()
                .filter_map(|e| e.subject_connection_id.as_ref().map(|id| id.to_string())),
        ))
    }

    async fn entries_by_actor(
        &self,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> ReportResult<Vec<ActivityLogModel>> {
        let session = self.uow.begin().await.map_err(|e| internal("Failed to read activity", e))?;
        let entries = session
            .activity_logs()
            .find_by_type_and_actor(activity_type, actor_user_id)
            .await;
        abandon(session, "reading activity by actor").await;
        entries.map_err(|e| internal("Failed to read activity", e))
    }
}

fn dedup(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryUnitOfWork;
    use std::sync::atomic::Ordering;

    fn ledger(uow: &MemoryUnitOfWork) -> ActivityLedger {
        ActivityLedger::new(Arc::new(uow.clone()), 2)
    }

    #[tokio::test]
    async fn test_append_and_find_subjects() {
        let uow = MemoryUnitOfWork::new();
        let ledger = ledger(&uow);
        let agent = Uuid::new_v4();

        for id in ["YT2025010001", "YT2025010003", "YT2025010001"] {
            ledger
                .append(LedgerEntry::new(ActivityType::ReportCreated, agent, id, "created"))
                .await
                .unwrap();
        }
        ledger
            .append(LedgerEntry::new(ActivityType::ReportCreated, Uuid::new_v4(), "YT2025010002", "created"))
            .await
            .unwrap();

        let subjects = ledger.find_subjects_by_actor(ActivityType::ReportCreated, agent).await.unwrap();
        assert_eq!(subjects, vec!["YT2025010001", "YT2025010003"]);
    }

    #[tokio::test]
    async fn test_connection_subjects() {
        let uow = MemoryUnitOfWork::new();
        let ledger = ledger(&uow);
        let agent = Uuid::new_v4();

        ledger
            .append(LedgerEntry::new(ActivityType::ReportCompleted, agent, "YT2025010001", "done").with_connection("PS2025010001"))
            .await
            .unwrap();
        ledger
            .append(LedgerEntry::new(ActivityType::ReportCompleted, agent, "YT2025010002", "manual"))
            .await
            .unwrap();

        let ids = ledger
            .find_connection_subjects_by_actor(ActivityType::ReportCompleted, agent)
            .await
            .unwrap();
        assert_eq!(ids, vec!["PS2025010001"]);
    }

    #[tokio::test]
    async fn test_record_swallows_failures() {
        let uow = MemoryUnitOfWork::new();
        uow.faults().fail_activity_append.store(true, Ordering::SeqCst);
        let ledger = ledger(&uow);

        let err = ledger
            .append(LedgerEntry::new(ActivityType::ReportDeleted, Uuid::new_v4(), "YT2025010001", "deleted"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Internal(ref m) if m.contains("REPORT_DELETED")));

        let recorded = ledger
            .record(LedgerEntry::new(ActivityType::ReportDeleted, Uuid::new_v4(), "YT2025010001", "deleted"))
            .await;
        assert!(recorded.is_none());
        assert!(uow.snapshot().await.activity_logs.is_empty());
    }

    #[tokio::test]
    async fn test_recent_defaults_exclude_updates() {
        let uow = MemoryUnitOfWork::new();
        let ledger = ledger(&uow);
        let actor = Uuid::new_v4();

        for activity_type in [ActivityType::ReportCreated, ActivityType::ReportUpdated, ActivityType::ReportProcessed] {
            ledger.append(LedgerEntry::new(activity_type, actor, "YT2025010001", "x")).await.unwrap();
        }

        let recent = ledger.recent(10, None).await.unwrap();
        let types: Vec<ActivityType> = recent.iter().map(|e| e.activity_type).collect();
        assert_eq!(types, vec![ActivityType::ReportProcessed, ActivityType::ReportCreated]);

        let all = ledger.recent(1, Some(&[])).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].activity_type, ActivityType::ReportProcessed);
    }

    #[test]
    fn test_message_truncated_on_char_boundary() {
        let long = "é".repeat(200);
        let message = truncated(&long);
        assert_eq!(message.chars().count(), 127);
        assert!(message.len() <= MESSAGE_LEN);
    }
}
