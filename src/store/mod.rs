//! Persistence seam. Handlers only ever talk to [`SwapStore`]; the
//! production implementation is [`postgres::PgStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    admin::repo_types::{AdminLog, NewAdminLog},
    skills::repo_types::UserSkills,
    swaps::repo_types::{NewSwapRequest, SwapRequest, SwapStatus},
    users::repo_types::{NewUser, User, UserProfile},
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const ONE_PENDING_KEY: &str = "swap_requests_one_pending_key";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("a pending request already exists for this pair")]
    PendingRequestExists,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let constraint = match &err {
            sqlx::Error::RowNotFound => return StoreError::NotFound("Record"),
            sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_owned),
            _ => None,
        };
        // unique violations are told apart by constraint name
        match constraint.as_deref() {
            Some(USERS_EMAIL_KEY) => StoreError::DuplicateEmail,
            Some(ONE_PENDING_KEY) => StoreError::PendingRequestExists,
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SwapStore: Send + Sync {
    /// Inserts a user together with their initial skills. Either both land
    /// or neither does.
    async fn create_user(
        &self,
        new: NewUser,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserProfile>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Public users other than `exclude`, with their skills.
    async fn list_public_users_excluding(&self, exclude: Uuid) -> StoreResult<Vec<UserProfile>>;

    /// Replaces both skill associations of a user. Names must already be
    /// normalized; unknown names are created. Lists come back sorted by name.
    async fn replace_user_skills(
        &self,
        user_id: Uuid,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserSkills>;

    /// Public users with an offered or wanted skill whose trigram similarity
    /// to `query` is above `threshold`, best match first.
    async fn search_users_by_skill(
        &self,
        query: &str,
        exclude: Option<Uuid>,
        threshold: f32,
    ) -> StoreResult<Vec<UserProfile>>;

    async fn has_pending_request(&self, requester_id: Uuid, receiver_id: Uuid) -> StoreResult<bool>;
    async fn create_swap_request(&self, new: NewSwapRequest) -> StoreResult<SwapRequest>;
    async fn list_received_requests(&self, user_id: Uuid) -> StoreResult<Vec<SwapRequest>>;
    async fn list_sent_requests(&self, user_id: Uuid) -> StoreResult<Vec<SwapRequest>>;
    async fn get_swap_request(&self, id: Uuid) -> StoreResult<Option<SwapRequest>>;

    /// Moves a pending request to `to`. Returns `None` when the request is
    /// missing or no longer pending.
    async fn transition_swap_request(
        &self,
        id: Uuid,
        to: SwapStatus,
    ) -> StoreResult<Option<SwapRequest>>;

    async fn log_admin_action(&self, entry: NewAdminLog) -> StoreResult<AdminLog>;
}
