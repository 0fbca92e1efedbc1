use chrono::Utc;
use heapless::String as HeaplessString;
use meter_report_api::{ActivityType, MeterType, ReportStatus};
use meter_report_db::models::activity_log::ActivityLogModel;
use meter_report_db::models::connection_report::ConnectionReportModel;
use meter_report_db::models::yantek_report::YantekReportModel;
use uuid::Uuid;

pub fn create_test_yantek_report(id: &str) -> YantekReportModel {
    let now = Utc::now();
    YantekReportModel {
        id: HeaplessString::try_from(id).unwrap(),
        customer_id: HeaplessString::try_from("PLG-001").unwrap(),
        meter_number: HeaplessString::try_from("MTR-0001").unwrap(),
        meter_type: MeterType::PrePaid,
        customer_phone: HeaplessString::try_from("081234567890").unwrap(),
        technician_name: HeaplessString::try_from("Budi").unwrap(),
        meter_reading_at_removal: None,
        remaining_credit: Some(HeaplessString::try_from("12.5").unwrap()),
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

pub fn create_test_connection_report(id: &str, yantek_report_id: &str) -> ConnectionReportModel {
    ConnectionReportModel {
        id: HeaplessString::try_from(id).unwrap(),
        yantek_report_id: HeaplessString::try_from(yantek_report_id).unwrap(),
        technician_name: HeaplessString::try_from("Andi").unwrap(),
        installed_meter_photo_path: HeaplessString::try_from(format!("connection-meter-photos/{id}.jpg").as_str()).unwrap(),
        customer_house_photo_path: HeaplessString::try_from(format!("connection-house-photos/{id}.jpg").as_str()).unwrap(),
        technician_photo_path: HeaplessString::try_from(format!("technician-photos/{id}.jpg").as_str()).unwrap(),
        installation_report_photo_path: HeaplessString::try_from(format!("connection-documents/{id}.jpg").as_str()).unwrap(),
        status: ReportStatus::Done,
        created_at: Utc::now(),
    }
}

pub fn create_test_activity_log(activity_type: ActivityType, subject_yantek_id: &str) -> ActivityLogModel {
    ActivityLogModel {
        id: Uuid::new_v4(),
        activity_type,
        actor_user_id: Uuid::new_v4(),
        subject_yantek_id: HeaplessString::try_from(subject_yantek_id).unwrap(),
        subject_connection_id: None,
        deleted_report_id: None,
        message: HeaplessString::try_from(format!("{activity_type} {subject_yantek_id}").as_str()).unwrap(),
        timestamp: Utc::now(),
    }
}
