use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a Yantek report.
///
/// `New -> InProgress -> Done`. `InProgress` may be skipped; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    New,
    InProgress,
    Done,
}

impl ReportStatus {
    /// Statuses that make up the active work queue.
    pub const ACTIVE: [ReportStatus; 2] = [ReportStatus::New, ReportStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::New => "NEW",
            ReportStatus::InProgress => "IN_PROGRESS",
            ReportStatus::Done => "DONE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Done)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(ReportStatus::New),
            "IN_PROGRESS" => Ok(ReportStatus::InProgress),
            "DONE" => Ok(ReportStatus::Done),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "meter_type", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeterType {
    PrePaid,
    PostPaid,
}

impl std::fmt::Display for MeterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeterType::PrePaid => write!(f, "PRE_PAID"),
            MeterType::PostPaid => write!(f, "POST_PAID"),
        }
    }
}

impl FromStr for MeterType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_PAID" => Ok(MeterType::PrePaid),
            "POST_PAID" => Ok(MeterType::PostPaid),
            _ => Err(()),
        }
    }
}

/// Kind of event recorded in the activity ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    ReportCreated,
    ReportCompleted,
    ReportProcessed,
    ReportUpdated,
    ReportDeleted,
}

impl ActivityType {
    /// Types shown in the recent-activity feed when no filter is given.
    pub const RECENT_DEFAULT: [ActivityType; 4] = [
        ActivityType::ReportCreated,
        ActivityType::ReportCompleted,
        ActivityType::ReportProcessed,
        ActivityType::ReportDeleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::ReportCreated => "REPORT_CREATED",
            ActivityType::ReportCompleted => "REPORT_COMPLETED",
            ActivityType::ReportProcessed => "REPORT_PROCESSED",
            ActivityType::ReportUpdated => "REPORT_UPDATED",
            ActivityType::ReportDeleted => "REPORT_DELETED",
        }
    }

    /// Ledger entry type emitted when a report moves to `new_status`.
    pub fn for_transition(new_status: ReportStatus) -> Self {
        match new_status {
            ReportStatus::Done => ActivityType::ReportCompleted,
            ReportStatus::InProgress => ActivityType::ReportProcessed,
            ReportStatus::New => ActivityType::ReportUpdated,
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPORT_CREATED" => Ok(ActivityType::ReportCreated),
            "REPORT_COMPLETED" => Ok(ActivityType::ReportCompleted),
            "REPORT_PROCESSED" => Ok(ActivityType::ReportProcessed),
            "REPORT_UPDATED" => Ok(ActivityType::ReportUpdated),
            "REPORT_DELETED" => Ok(ActivityType::ReportDeleted),
            _ => Err(()),
        }
    }
}

/// Role of the authenticated caller, resolved outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    /// Field technician who files Yantek reports.
    YantekAgent,
    /// Field technician who files connection reports.
    ConnectionAgent,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::YantekAgent => write!(f, "YANTEK_AGENT"),
            UserRole::ConnectionAgent => write!(f, "CONNECTION_AGENT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_activity_types() {
        assert_eq!(ActivityType::for_transition(ReportStatus::Done), ActivityType::ReportCompleted);
        assert_eq!(ActivityType::for_transition(ReportStatus::InProgress), ActivityType::ReportProcessed);
        assert_eq!(ActivityType::for_transition(ReportStatus::New), ActivityType::ReportUpdated);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&ReportStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
        assert_eq!("DONE".parse::<ReportStatus>(), Ok(ReportStatus::Done));
        assert!("SELESAI".parse::<ReportStatus>().is_err());
        assert_eq!(serde_json::to_string(&MeterType::PrePaid).unwrap(), "\"PRE_PAID\"");
    }
}
