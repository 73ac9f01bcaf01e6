use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{Skill, SkillKind, UserSkillRow};
use crate::store::StoreResult;

/// Find a skill by name ignoring case, creating it on first reference.
pub async fn upsert_by_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> StoreResult<Skill> {
    sqlx::query(
        r#"
        INSERT INTO skills (name)
        VALUES ($1)
        ON CONFLICT (lower(name)) DO NOTHING
        "#,
    )
    .bind(name)
    .execute(&mut **tx)
    .await?;

    let skill = sqlx::query_as::<_, Skill>(
        r#"
        SELECT id, name
          FROM skills
         WHERE lower(name) = lower($1)
        "#,
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;
    Ok(skill)
}

/// Swap the whole association list of one kind for `skills`.
pub async fn replace_for_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    kind: SkillKind,
    skills: &[Skill],
) -> StoreResult<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", kind.table()))
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    let ids: Vec<Uuid> = skills.iter().map(|s| s.id).collect();
    sqlx::query(&format!(
        r#"
        INSERT INTO {} (user_id, skill_id)
        SELECT $1, skill_id FROM UNNEST($2::uuid[]) AS t(skill_id)
        ON CONFLICT DO NOTHING
        "#,
        kind.table()
    ))
    .bind(user_id)
    .bind(&ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// All offered and wanted skills for a batch of users.
pub async fn list_for_users(db: &PgPool, user_ids: &[Uuid]) -> StoreResult<Vec<UserSkillRow>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, UserSkillRow>(
        r#"
        SELECT a.user_id, s.id AS skill_id, s.name, a.offered
          FROM (
                SELECT user_id, skill_id, TRUE AS offered FROM user_offered_skills
                 WHERE user_id = ANY($1)
                UNION ALL
                SELECT user_id, skill_id, FALSE AS offered FROM user_wanted_skills
                 WHERE user_id = ANY($1)
               ) a
          JOIN skills s ON s.id = a.skill_id
         ORDER BY s.name ASC
        "#,
    )
    .bind(user_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
