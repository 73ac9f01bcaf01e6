use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{SearchParams, UpdateSkillsRequest, UpdateSkillsResponse, UsersResponse};
use crate::{
    auth::extractors::{AuthUser, MaybeAuthUser},
    error::{AppError, AppJson, AppResult},
    skills::services::normalize_names,
    state::AppState,
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/public", get(list_public_users))
        .route("/users/skills", put(update_skills))
        .route("/users/search", get(search_users))
}

#[instrument(skip(state))]
pub async fn list_public_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UsersResponse>> {
    let users = state.store.list_public_users_excluding(user_id).await?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state, payload))]
pub async fn update_skills(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<UpdateSkillsRequest>,
) -> AppResult<Json<UpdateSkillsResponse>> {
    let offered = normalize_names(&payload.skills_offered);
    let wanted = normalize_names(&payload.skills_wanted);
    let skills = state
        .store
        .replace_user_skills(user_id, &offered, &wanted)
        .await?;

    info!(%user_id, offered = skills.offered.len(), wanted = skills.wanted.len(), "skills updated");
    Ok(Json(UpdateSkillsResponse {
        message: "Skills updated successfully",
        skills_offered: skills.offered,
        skills_wanted: skills.wanted,
    }))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<UsersResponse>> {
    let query = params.skill.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::BadRequest("Missing skill query parameter".into()));
    }

    let users = state
        .store
        .search_users_by_skill(query, caller, state.config.similarity_threshold)
        .await?;
    Ok(Json(UsersResponse { users }))
}
