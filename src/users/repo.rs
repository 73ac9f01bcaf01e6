use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::store::StoreResult;

const USER_COLUMNS: &str = "u.id, u.name, u.email, u.password_hash, u.location, \
     u.availability, u.is_public, u.role, u.created_at, u.updated_at";

/// Create a new user; the password must already be hashed.
pub async fn create_tx(tx: &mut Transaction<'_, Postgres>, new: &NewUser) -> StoreResult<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, location, availability, is_public)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, email, password_hash, location, availability,
                  is_public, role, created_at, updated_at
        "#,
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(&new.location)
    .bind(&new.availability)
    .bind(new.is_public)
    .fetch_one(&mut **tx)
    .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn list_public_excluding(db: &PgPool, exclude: Uuid) -> StoreResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
          FROM users u
         WHERE u.is_public AND u.id <> $1
         ORDER BY u.created_at ASC
        "#
    ))
    .bind(exclude)
    .fetch_all(db)
    .await?;
    Ok(users)
}

/// Public users ranked by their best pg_trgm match over offered and wanted
/// skills. The query text is always bound, never interpolated.
pub async fn search_by_skill(
    db: &PgPool,
    query: &str,
    exclude: Option<Uuid>,
    threshold: f32,
) -> StoreResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
          FROM users u
          JOIN (
                SELECT m.user_id, MAX(similarity(s.name, $1)) AS score
                  FROM (
                        SELECT user_id, skill_id FROM user_offered_skills
                        UNION ALL
                        SELECT user_id, skill_id FROM user_wanted_skills
                       ) m
                  JOIN skills s ON s.id = m.skill_id
                 GROUP BY m.user_id
               ) best ON best.user_id = u.id
         WHERE u.is_public
           AND best.score > $2
           AND ($3::uuid IS NULL OR u.id <> $3)
         ORDER BY best.score DESC, u.created_at ASC
        "#
    ))
    .bind(query)
    .bind(threshold)
    .bind(exclude)
    .fetch_all(db)
    .await?;
    Ok(users)
}
