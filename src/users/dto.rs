use serde::{Deserialize, Serialize};

use crate::{skills::repo_types::Skill, users::repo_types::UserProfile};

#[derive(Debug, Deserialize)]
pub struct UpdateSkillsRequest {
    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_wanted: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateSkillsResponse {
    pub message: &'static str,
    pub skills_offered: Vec<Skill>,
    pub skills_wanted: Vec<Skill>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub skill: Option<String>,
}
