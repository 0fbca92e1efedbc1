use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReportError;

/// Named photo slot of a report. Each slot is staged into its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentSlot {
    HousePhoto,
    BrokenMeterPhoto,
    TechnicianPhoto,
    IncidentReportPhoto,
    InstalledMeterPhoto,
    CustomerHousePhoto,
    InstallationReportPhoto,
}

impl AttachmentSlot {
    pub const ALL: [AttachmentSlot; 7] = [
        AttachmentSlot::HousePhoto,
        AttachmentSlot::BrokenMeterPhoto,
        AttachmentSlot::TechnicianPhoto,
        AttachmentSlot::IncidentReportPhoto,
        AttachmentSlot::InstalledMeterPhoto,
        AttachmentSlot::CustomerHousePhoto,
        AttachmentSlot::InstallationReportPhoto,
    ];

    /// Storage subdirectory, relative to the upload root.
    pub fn directory(&self) -> &'static str {
        match self {
            AttachmentSlot::HousePhoto => "house-photos",
            AttachmentSlot::BrokenMeterPhoto => "meter-photos",
            AttachmentSlot::TechnicianPhoto => "technician-photos",
            AttachmentSlot::IncidentReportPhoto => "documents",
            AttachmentSlot::InstalledMeterPhoto => "connection-meter-photos",
            AttachmentSlot::CustomerHousePhoto => "connection-house-photos",
            AttachmentSlot::InstallationReportPhoto => "connection-documents",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttachmentSlot::HousePhoto => "house photo",
            AttachmentSlot::BrokenMeterPhoto => "broken meter photo",
            AttachmentSlot::TechnicianPhoto => "technician photo",
            AttachmentSlot::IncidentReportPhoto => "incident report photo",
            AttachmentSlot::InstalledMeterPhoto => "installed meter photo",
            AttachmentSlot::CustomerHousePhoto => "customer house photo",
            AttachmentSlot::InstallationReportPhoto => "installation report photo",
        }
    }
}

impl fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content types accepted for report photos.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// A binary upload as handed over by the transport layer.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AttachmentUpload {
    pub fn new(
        original_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for AttachmentUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentUpload")
            .field("original_name", &self.original_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// An upload paired with the slot it fills, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlottedAttachment {
    pub slot: AttachmentSlot,
    pub upload: AttachmentUpload,
}

fn collect_slots(
    slots: Vec<(AttachmentSlot, Option<AttachmentUpload>)>,
) -> Result<Vec<SlottedAttachment>, ReportError> {
    if slots.iter().any(|(_, upload)| upload.is_none()) {
        let missing: Vec<&str> = slots
            .iter()
            .filter(|(_, upload)| upload.is_none())
            .map(|(slot, _)| slot.label())
            .collect();
        return Err(ReportError::ValidationFailed(format!(
            "All photos must be uploaded; missing: {}",
            missing.join(", ")
        )));
    }

    let mut validated = Vec::with_capacity(slots.len());
    for (slot, upload) in slots {
        let Some(upload) = upload else { continue };
        if !is_allowed_image_type(&upload.content_type) {
            return Err(ReportError::ValidationFailed(format!(
                "File {slot} must be an image (jpg, jpeg or png); received content type {}",
                upload.content_type
            )));
        }
        validated.push(SlottedAttachment { slot, upload });
    }
    Ok(validated)
}

/// Photos submitted with a new Yantek report.
#[derive(Debug, Clone, Default)]
pub struct YantekAttachments {
    pub house_photo: Option<AttachmentUpload>,
    pub broken_meter_photo: Option<AttachmentUpload>,
    pub technician_photo: Option<AttachmentUpload>,
    pub incident_report_photo: Option<AttachmentUpload>,
}

impl YantekAttachments {
    /// Checks that every slot is filled with an allow-listed image type.
    pub fn into_validated(self) -> Result<Vec<SlottedAttachment>, ReportError> {
        collect_slots(vec![
            (AttachmentSlot::HousePhoto, self.house_photo),
            (AttachmentSlot::BrokenMeterPhoto, self.broken_meter_photo),
            (AttachmentSlot::TechnicianPhoto, self.technician_photo),
            (AttachmentSlot::IncidentReportPhoto, self.incident_report_photo),
        ])
    }
}

/// Photos submitted with a connection report.
#[derive(Debug, Clone, Default)]
pub struct ConnectionAttachments {
    pub installed_meter_photo: Option<AttachmentUpload>,
    pub customer_house_photo: Option<AttachmentUpload>,
    pub technician_photo: Option<AttachmentUpload>,
    pub installation_report_photo: Option<AttachmentUpload>,
}

impl ConnectionAttachments {
    pub fn into_validated(self) -> Result<Vec<SlottedAttachment>, ReportError> {
        collect_slots(vec![
            (AttachmentSlot::InstalledMeterPhoto, self.installed_meter_photo),
            (AttachmentSlot::CustomerHousePhoto, self.customer_house_photo),
            (AttachmentSlot::TechnicianPhoto, self.technician_photo),
            (AttachmentSlot::InstallationReportPhoto, self.installation_report_photo),
        ])
    }
}
