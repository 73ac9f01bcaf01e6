use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::skills::repo_types::{Skill, UserSkillRow, UserSkills};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never leaves the server
    pub location: String,
    pub availability: String,
    pub is_public: bool,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub location: String,
    pub availability: String,
    pub is_public: bool,
}

/// A user together with both skill lists, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub skills_offered: Vec<Skill>,
    pub skills_wanted: Vec<Skill>,
}

impl UserProfile {
    pub fn new(user: User, skills: UserSkills) -> Self {
        Self {
            user,
            skills_offered: skills.offered,
            skills_wanted: skills.wanted,
        }
    }

    /// Zips users with skill rows fetched in one batch, keeping user order.
    pub fn assemble(users: Vec<User>, rows: Vec<UserSkillRow>) -> Vec<UserProfile> {
        let mut by_user: HashMap<Uuid, UserSkills> = HashMap::new();
        for row in rows {
            let entry = by_user.entry(row.user_id).or_default();
            let skill = Skill {
                id: row.skill_id,
                name: row.name,
            };
            if row.offered {
                entry.offered.push(skill);
            } else {
                entry.wanted.push(skill);
            }
        }
        users
            .into_iter()
            .map(|u| {
                let skills = by_user.remove(&u.id).unwrap_or_default();
                UserProfile::new(u, skills)
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn sample_user(name: &str, is_public: bool) -> User {
    let now = OffsetDateTime::now_utc();
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
        location: String::new(),
        availability: String::new(),
        is_public,
        role: Role::User,
        created_at: now,
        updated_at: now,
    }
}
