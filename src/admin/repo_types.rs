use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "admin_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Ban,
    RejectDescription,
}

/// Audit entry written when an admin acts on a user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminLog {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub target_user_id: Uuid,
    pub action: AdminAction,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAdminLog {
    pub admin_id: Uuid,
    pub target_user_id: Uuid,
    pub action: AdminAction,
    pub message: String,
}
