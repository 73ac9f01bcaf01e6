use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::SwapRequest;

#[derive(Debug, Deserialize)]
pub struct CreateSwapRequestInput {
    pub receiver_id: Uuid,
    pub offered_skill: String,
    pub wanted_skill: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub message: String,
    pub request: SwapRequest,
}
