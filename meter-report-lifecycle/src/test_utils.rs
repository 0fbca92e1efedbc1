use chrono::Utc;
use heapless::String as HeaplessString;
use meter_report_api::{
    AttachmentUpload, CompleteReportRequest, ConnectionAttachments, CreateYantekRequest, MeterType, ReportStatus,
    YantekAttachments,
};
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::models::yantek_report::YantekReportModel;
use std::sync::Arc;

use crate::config::LifecycleConfig;
use crate::engine::ReportEngine;
use crate::image::PassthroughImageProcessor;
use crate::memory::{MemoryBlobStore, MemoryUnitOfWork};

/// A JPEG upload of `size` bytes.
pub fn jpeg(name: &str, size: usize) -> AttachmentUpload {
    AttachmentUpload::new(name, "image/jpeg", vec![0xD8; size])
}

pub fn yantek_attachments() -> YantekAttachments {
    YantekAttachments {
        house_photo: Some(jpeg("house.jpg", 16)),
        broken_meter_photo: Some(jpeg("meter.JPG", 16)),
        technician_photo: Some(jpeg("technician.jpeg", 16)),
        incident_report_photo: Some(AttachmentUpload::new("incident.png", "image/png", vec![0x89; 16])),
    }
}

pub fn connection_attachments() -> ConnectionAttachments {
    ConnectionAttachments {
        installed_meter_photo: Some(jpeg("new-meter.jpg", 16)),
        customer_house_photo: Some(jpeg("house.jpg", 16)),
        technician_photo: Some(jpeg("technician.jpg", 16)),
        installation_report_photo: Some(jpeg("installation.jpg", 16)),
    }
}

pub fn yantek_request() -> CreateYantekRequest {
    CreateYantekRequest {
        customer_id: "PLG-001".to_string(),
        meter_number: "MTR-0001".to_string(),
        meter_type: MeterType::PrePaid,
        customer_phone: "081234567890".to_string(),
        technician_name: "Budi".to_string(),
        meter_reading_at_removal: Some("10234".to_string()),
        remaining_credit: Some("12.5".to_string()),
        coordinates: "-6.2,106.8".to_string(),
        notes: None,
    }
}

pub fn complete_request() -> CompleteReportRequest {
    CompleteReportRequest {
        technician_name: "Andi".to_string(),
    }
}

pub fn yantek_model(id: &str) -> YantekReportModel {
    let now = Utc::now();
    YantekReportModel {
        id: HeaplessString::try_from(id).unwrap(),
        customer_id: HeaplessString::try_from("PLG-001").unwrap(),
        meter_number: HeaplessString::try_from("MTR-0001").unwrap(),
        meter_type: MeterType::PrePaid,
        customer_phone: HeaplessString::try_from("081234567890").unwrap(),
        technician_name: HeaplessString::try_from("Budi").unwrap(),
        meter_reading_at_removal: None,
        remaining_credit: None,
        coordinates: HeaplessString::try_from("-6.2,106.8").unwrap(),
        notes: None,
        house_photo_path: HeaplessString::try_from(format!("house-photos/{id}.jpg").as_str()).unwrap(),
        broken_meter_photo_path: HeaplessString::try_from(format!("meter-photos/{id}.jpg").as_str()).unwrap(),
        technician_photo_path: HeaplessString::try_from(format!("technician-photos/{id}.jpg").as_str()).unwrap(),
        incident_report_photo_path: HeaplessString::try_from(format!("documents/{id}.jpg").as_str()).unwrap(),
        status: ReportStatus::New,
        created_at: now,
        updated_at: now,
    }
}

pub fn connection_model(id: &str, yantek_report_id: &str) -> ConnectionReportModel {
    ConnectionReportModel {
        id: HeaplessString::try_from(id).unwrap(),
        yantek_report_id: HeaplessString::try_from(yantek_report_id).unwrap(),
        technician_name: HeaplessString::try_from("Andi").unwrap(),
        installed_meter_photo_path: HeaplessString::try_from(format!("connection-meter-photos/{id}.jpg").as_str())
            .unwrap(),
        customer_house_photo_path: HeaplessString::try_from(format!("connection-house-photos/{id}.jpg").as_str())
            .unwrap(),
        technician_photo_path: HeaplessString::try_from(format!("technician-photos/{id}.jpg").as_str()).unwrap(),
        installation_report_photo_path: HeaplessString::try_from(format!("connection-documents/{id}.jpg").as_str())
            .unwrap(),
        status: ReportStatus::Done,
        created_at: Utc::now(),
    }
}

/// Engine over in-memory storage, with handles on both stores.
pub struct TestEngine {
    pub engine: ReportEngine,
    pub uow: MemoryUnitOfWork,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_store(MemoryUnitOfWork::new())
    }

    pub fn with_store(uow: MemoryUnitOfWork) -> Self {
        let blobs = Arc::new(MemoryBlobStore::new());
        let engine = ReportEngine::new(
            Arc::new(uow.clone()),
            blobs.clone(),
            Arc::new(PassthroughImageProcessor),
            &LifecycleConfig::default(),
        );
        Self { engine, uow, blobs }
    }
}
