use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserRole;

/// Identity of the caller, resolved by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub actor_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(actor_id: Uuid, role: UserRole) -> Self {
        Self { actor_id, role }
    }

    pub fn admin(actor_id: Uuid) -> Self {
        Self::new(actor_id, UserRole::Admin)
    }

    pub fn yantek_agent(actor_id: Uuid) -> Self {
        Self::new(actor_id, UserRole::YantekAgent)
    }

    pub fn connection_agent(actor_id: Uuid) -> Self {
        Self::new(actor_id, UserRole::ConnectionAgent)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
