use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
}

/// Which side of the swap a skill association sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Offered,
    Wanted,
}

impl SkillKind {
    pub fn table(self) -> &'static str {
        match self {
            SkillKind::Offered => "user_offered_skills",
            SkillKind::Wanted => "user_wanted_skills",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserSkills {
    pub offered: Vec<Skill>,
    pub wanted: Vec<Skill>,
}

impl UserSkills {
    /// Orders both lists by name, matching how listings return them.
    pub fn sorted(mut self) -> Self {
        self.offered.sort_by(|a, b| a.name.cmp(&b.name));
        self.wanted.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }
}

/// One association row, fetched in bulk for a page of users.
#[derive(Debug, FromRow)]
pub struct UserSkillRow {
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub name: String,
    pub offered: bool,
}
