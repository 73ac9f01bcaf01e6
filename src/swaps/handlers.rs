use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateSwapRequestInput, StatusChangeResponse},
    repo_types::{NewSwapRequest, SwapRequest, SwapStatus},
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

pub fn swap_routes() -> Router<AppState> {
    Router::new()
        .route("/request", post(create_swap_request))
        .route("/getAllreqest", get(list_received_requests))
        .route("/requests/sent", get(list_sent_requests))
        .route("/acceptRequest/:id", post(accept_swap_request))
        .route("/declineRequest/:id", post(decline_swap_request))
}

#[instrument(skip(state, input))]
pub async fn create_swap_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(input): AppJson<CreateSwapRequestInput>,
) -> AppResult<(StatusCode, Json<SwapRequest>)> {
    let offered_skill = input.offered_skill.trim().to_string();
    let wanted_skill = input.wanted_skill.trim().to_string();
    if offered_skill.is_empty() || wanted_skill.is_empty() {
        return Err(AppError::BadRequest(
            "offered_skill and wanted_skill are required".into(),
        ));
    }
    if input.receiver_id == user_id {
        return Err(AppError::BadRequest("Cannot send a request to yourself".into()));
    }
    if state.store.find_user_by_id(input.receiver_id).await?.is_none() {
        return Err(AppError::NotFound("Receiver not found".into()));
    }
    if state
        .store
        .has_pending_request(user_id, input.receiver_id)
        .await?
    {
        warn!(%user_id, receiver_id = %input.receiver_id, "duplicate pending request");
        return Err(AppError::Conflict("Request already pending".into()));
    }

    // a concurrent duplicate still loses on the partial unique index
    let req = state
        .store
        .create_swap_request(NewSwapRequest {
            requester_id: user_id,
            receiver_id: input.receiver_id,
            offered_skill,
            wanted_skill,
            message: input.message.trim().to_string(),
        })
        .await?;

    info!(request_id = %req.id, %user_id, receiver_id = %req.receiver_id, "swap request created");
    Ok((StatusCode::CREATED, Json(req)))
}

#[instrument(skip(state))]
pub async fn list_received_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<SwapRequest>>> {
    Ok(Json(state.store.list_received_requests(user_id).await?))
}

#[instrument(skip(state))]
pub async fn list_sent_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<SwapRequest>>> {
    Ok(Json(state.store.list_sent_requests(user_id).await?))
}

#[instrument(skip(state, id))]
pub async fn accept_swap_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<StatusChangeResponse>> {
    settle(state, user_id, id, SwapStatus::Accepted).await
}

#[instrument(skip(state, id))]
pub async fn decline_swap_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<StatusChangeResponse>> {
    settle(state, user_id, id, SwapStatus::Declined).await
}

/// Shared body of accept/decline: only the receiver may settle, and only
/// while the request is still pending.
async fn settle(
    state: AppState,
    user_id: Uuid,
    id: Result<Path<Uuid>, PathRejection>,
    to: SwapStatus,
) -> AppResult<Json<StatusChangeResponse>> {
    let Ok(Path(id)) = id else {
        return Err(AppError::BadRequest("Invalid request ID".into()));
    };

    let Some(current) = state.store.get_swap_request(id).await? else {
        return Err(AppError::NotFound("Swap request not found".into()));
    };
    if current.receiver_id != user_id {
        warn!(request_id = %id, %user_id, "settle attempted by non-receiver");
        return Err(AppError::Forbidden(
            "Only the receiver can respond to this request".into(),
        ));
    }
    if current.status != SwapStatus::Pending {
        return Err(AppError::BadRequest("Request already processed".into()));
    }

    // None here means another call settled it first
    let Some(updated) = state.store.transition_swap_request(id, to).await? else {
        return Err(AppError::BadRequest("Request already processed".into()));
    };

    info!(request_id = %id, status = %to, "swap request settled");
    Ok(Json(StatusChangeResponse {
        message: format!("Request {} successfully", to),
        request: updated,
    }))
}
