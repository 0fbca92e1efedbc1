use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use meter_report_api::{MeterType, ReportStatus};
use serde::{Deserialize, Serialize};

use crate::models::identifiable::Identifiable;
use crate::models::report_id::REPORT_ID_LEN;

/// Capacity of stored attachment paths, e.g. `house-photos/<uuid>.jpeg`.
pub const ATTACHMENT_PATH_LEN: usize = 200;

/// # Documentation
/// Technician dispatch record documenting a faulty meter.
///
/// - `id` has the form `YT<YYYYMM><seq>` and never changes.
/// - Photo paths are relative to the blob store root and are immutable once set.
/// - Only `status`, `technician_name` and `meter_type` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YantekReportModel {
    pub id: HeaplessString<REPORT_ID_LEN>,

    pub customer_id: HeaplessString<50>,
    pub meter_number: HeaplessString<50>,
    pub meter_type: MeterType,
    pub customer_phone: HeaplessString<20>,
    pub technician_name: HeaplessString<100>,

    /// Meter stand recorded when the broken meter was removed
    pub meter_reading_at_removal: Option<HeaplessString<50>>,

    /// Credit left on a prepaid meter at removal
    pub remaining_credit: Option<HeaplessString<50>>,

    pub coordinates: HeaplessString<100>,
    pub notes: Option<HeaplessString<255>>,

    pub house_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,
    pub broken_meter_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,
    pub technician_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,
    pub incident_report_photo_path: HeaplessString<ATTACHMENT_PATH_LEN>,

    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl YantekReportModel {
    /// Every stored attachment path, in slot order.
    pub fn attachment_paths(&self) -> Vec<&str> {
        vec![
            self.house_photo_path.as_str(),
            self.broken_meter_photo_path.as_str(),
            self.technician_photo_path.as_str(),
            self.incident_report_photo_path.as_str(),
        ]
    }
}

impl Identifiable for YantekReportModel {
    fn get_id(&self) -> &str {
        self.id.as_str()
    }
}
