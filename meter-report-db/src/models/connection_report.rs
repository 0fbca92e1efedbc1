use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use meter_report_api::ReportStatus;
use serde::{Deserialize, Serialize};

use crate::models::identifiable::Identifiable;
use crate::models::report_id::REPORT_ID_LEN;
use crate::models::yantek_report::{YantekReportModel, ATTACHMENT_PATH_LEN};

/// # Documentation
/// Completion record closing out exactly one Yantek report.
///
/// - `yantek_report_id` is unique: a parent has at most one connection report.
/// - Created with status `Done`; never updated, only deleted together with its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReportModel {
    pub id: HeaplessString<REPORT_ID_LEN>,

    /// Reference to the Yantek report this record completes
    pub yantek_report_id: HeaplessString<REPORT_ID_LEN>,

    pub technician_name: HeaplessString<100>,

    pub installed_meter_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,
    pub customer_house_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,
    pub technician_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,
    pub installation_report_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,

    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl ConnectionReportModel {
    pub fn attachment_paths(&self) -> Vec<&str> {
        vec![
            self.installed_meter_photo_path.as_str(),
            self.customer_house_photo_path.as_str(),
            self.technician_photo_path.as_str(),
            self.installation_report_photo_path.as_str(),
        ]
    }
}

impl Identifiable for ConnectionReportModel {
    fn get_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Completed Yantek report joined with its connection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YantekHistoryItem {
    #[serde(flatten)]
    pub report: YantekReportModel,
    pub connection_report: Option<ConnectionReportModel>,
}

/// Connection report joined with the parent it completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReportItem {
    #[serde(flatten)]
    pub report: ConnectionReportModel,
    pub yantek_report: Option<YantekReportModel>,
}
