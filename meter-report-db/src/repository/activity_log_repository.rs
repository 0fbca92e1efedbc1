use async_trait::async_trait;
use meter_report_api::ActivityType;
use uuid::Uuid;

use crate::models::activity_log::ActivityLogModel;

/// Repository for the append-only `activity_log` table
///
/// There is deliberately no update or delete operation.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append an entry
    async fn create(&self, entry: &ActivityLogModel) -> Result<ActivityLogModel, Box<dyn std::error::Error + Send + Sync>>;

    /// Latest entries of the given types, newest first
    ///
    /// # Arguments
    /// * `limit` - Maximum number of entries
    /// * `types` - Accepted activity types; empty accepts every type
    async fn find_recent(
        &self,
        limit: usize,
        types: &[ActivityType],
    ) -> Result<Vec<ActivityLogModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Every entry of `activity_type` recorded for `actor_user_id`, oldest first
    async fn find_by_type_and_actor(
        &self,
        activity_type: ActivityType,
        actor_user_id: Uuid,
    ) -> Result<Vec<ActivityLogModel>, Box<dyn std::error::Error + Send + Sync>>;
}
