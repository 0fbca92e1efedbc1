use async_trait::async_trait;
use meter_report_api::ActivityType;
use meter_report_db::models::activity_log::ActivityLogModel;
use meter_report_db::repository::activity_log_repository::ActivityLogRepository;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;
use uuid::Uuid;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

pub struct ActivityLogRepositoryImpl {
    pub(crate) executor: Executor,
}

impl ActivityLogRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for ActivityLogModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ActivityLogModel {
            id: row.try_get("id")?,
            activity_type: row.try_get("activity_type")?,
            actor_user_id: row.try_get("actor_user_id")?,
            subject_yantek_id: get_heapless_string(row, "subject_yantek_id")?,
            subject_connection_id: get_optional_heapless_string(row, "subject_connection_id")?,
            deleted_report_id: get_optional_heapless_string(row, "deleted_report_id")?,
            message: get_heapless_string(row, "message")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

#[async_trait]
impl ActivityLogRepository for ActivityLogRepositoryImpl {
    async fn create(&self, entry: &ActivityLogModel) -> Result<ActivityLogModel, Box<dyn Error + Send + Sync>> {
        Self::create_impl(self, entry).await
    }

    async fn find_recent(
        &self,
        limit: usize,
        types: &[ActivityType],
    ) -> Result<Vec<ActivityLogModel>, Box<dyn Error + Send + Sync>> {
        Self::find_recent_impl(self, limit, types).await
    }

    async fn find_by_type_and_actor(
        &self,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> Result<Vec<ActivityLogModel>, Box<dyn Error + Send + Sync>> {
        Self::find_by_type_and_actor_impl(self, activity_type, actor_user_id).await
    }
}
