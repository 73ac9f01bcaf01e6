use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewSwapRequest, SwapRequest, SwapStatus};
use crate::store::StoreResult;

const RETURNING: &str = "id, requester_id, receiver_id, offered_skill, wanted_skill, \
     message, status, created_at, updated_at";

pub async fn has_pending(db: &PgPool, requester_id: Uuid, receiver_id: Uuid) -> StoreResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
              FROM swap_requests
             WHERE requester_id = $1 AND receiver_id = $2 AND status = 'pending'
        )
        "#,
    )
    .bind(requester_id)
    .bind(receiver_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn create(db: &PgPool, new: &NewSwapRequest) -> StoreResult<SwapRequest> {
    let req = sqlx::query_as::<_, SwapRequest>(&format!(
        r#"
        INSERT INTO swap_requests (requester_id, receiver_id, offered_skill, wanted_skill, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {RETURNING}
        "#
    ))
    .bind(new.requester_id)
    .bind(new.receiver_id)
    .bind(&new.offered_skill)
    .bind(&new.wanted_skill)
    .bind(&new.message)
    .fetch_one(db)
    .await?;
    Ok(req)
}

pub async fn list_received(db: &PgPool, user_id: Uuid) -> StoreResult<Vec<SwapRequest>> {
    let rows = sqlx::query_as::<_, SwapRequest>(&format!(
        "SELECT {RETURNING} FROM swap_requests WHERE receiver_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_sent(db: &PgPool, user_id: Uuid) -> StoreResult<Vec<SwapRequest>> {
    let rows = sqlx::query_as::<_, SwapRequest>(&format!(
        "SELECT {RETURNING} FROM swap_requests WHERE requester_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> StoreResult<Option<SwapRequest>> {
    let row = sqlx::query_as::<_, SwapRequest>(&format!(
        "SELECT {RETURNING} FROM swap_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Conditional update: only a row still in `pending` is touched, so two
/// racing transitions cannot both succeed.
pub async fn transition(
    db: &PgPool,
    id: Uuid,
    to: SwapStatus,
) -> StoreResult<Option<SwapRequest>> {
    let row = sqlx::query_as::<_, SwapRequest>(&format!(
        r#"
        UPDATE swap_requests
           SET status = $2, updated_at = now()
         WHERE id = $1 AND status = 'pending'
        RETURNING {RETURNING}
        "#
    ))
    .bind(id)
    .bind(to)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
