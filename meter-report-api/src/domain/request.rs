use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use super::enums::{MeterType, ReportStatus};

/// Indonesian mobile number: `+62`, `62` or `0`, then `8`, then 7 to 11 digits.
pub static CUSTOMER_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+62|62|0)8[1-9][0-9]{6,10}$").expect("customer phone pattern is valid")
});

/// Input for filing a new Yantek report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateYantekRequest {
    #[validate(length(min = 1, max = 50, message = "customer id is required"))]
    pub customer_id: String,

    #[validate(length(min = 1, max = 50, message = "meter number is required"))]
    pub meter_number: String,

    pub meter_type: MeterType,

    #[validate(regex(path = *CUSTOMER_PHONE, message = "invalid phone number; use the Indonesian format"))]
    pub customer_phone: String,

    #[validate(length(min = 1, max = 100, message = "technician name is required"))]
    pub technician_name: String,

    #[validate(length(max = 50))]
    pub meter_reading_at_removal: Option<String>,

    #[validate(length(max = 50))]
    pub remaining_credit: Option<String>,

    #[validate(length(min = 1, max = 100, message = "coordinates are required"))]
    pub coordinates: String,

    #[validate(length(max = 255))]
    pub notes: Option<String>,
}

/// Input for closing out a Yantek report with a connection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CompleteReportRequest {
    #[validate(length(min = 1, max = 100, message = "technician name is required"))]
    pub technician_name: String,
}

/// Status change, optionally patching the technician name or meter type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,

    #[validate(length(min = 1, max = 100))]
    pub technician_name: Option<String>,

    pub meter_type: Option<MeterType>,
}

impl UpdateStatusRequest {
    pub fn status_only(status: ReportStatus) -> Self {
        Self {
            status,
            technician_name: None,
            meter_type: None,
        }
    }
}

/// Page selection for listings. Both values are 1-based and default to page 1 of 10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PaginationQuery {
    #[validate(range(min = 1))]
    pub page: Option<usize>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,

    /// Overrides the active-queue status set.
    pub status: Option<ReportStatus>,
}

impl PaginationQuery {
    pub const DEFAULT_PAGE: usize = 1;
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            status: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(Self::DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).max(1)
    }
}
