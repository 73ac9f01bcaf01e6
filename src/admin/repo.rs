use sqlx::PgPool;

use super::repo_types::{AdminLog, NewAdminLog};
use crate::store::StoreResult;

pub async fn insert(db: &PgPool, entry: &NewAdminLog) -> StoreResult<AdminLog> {
    let log = sqlx::query_as::<_, AdminLog>(
        r#"
        INSERT INTO admin_logs (admin_id, target_user_id, action, message)
        VALUES ($1, $2, $3, $4)
        RETURNING id, admin_id, target_user_id, action, message, created_at
        "#,
    )
    .bind(entry.admin_id)
    .bind(entry.target_user_id)
    .bind(entry.action)
    .bind(&entry.message)
    .fetch_one(db)
    .await?;
    Ok(log)
}
