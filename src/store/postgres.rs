use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::{StoreError, StoreResult, SwapStore};
use crate::{
    admin::{
        self,
        repo_types::{AdminLog, NewAdminLog},
    },
    config::DatabaseConfig,
    skills::{
        self,
        repo_types::{SkillKind, UserSkills},
    },
    swaps::{
        self,
        repo_types::{NewSwapRequest, SwapRequest, SwapStatus},
    },
    users::{
        self,
        repo_types::{NewUser, User, UserProfile},
    },
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
            .connect(&cfg.url)
            .await
            .context("connect to database")?;
        info!(
            max_connections = cfg.max_connections,
            min_connections = cfg.min_connections,
            "database pool ready"
        );
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        info!("migrations applied");
        Ok(())
    }

    async fn with_skills(&self, users: Vec<User>) -> StoreResult<Vec<UserProfile>> {
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let rows = skills::repo::list_for_users(&self.db, &ids).await?;
        Ok(UserProfile::assemble(users, rows))
    }

    async fn write_skills_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserSkills> {
        let mut result = UserSkills::default();
        for name in offered {
            result
                .offered
                .push(skills::repo::upsert_by_name_tx(tx, name).await?);
        }
        for name in wanted {
            result
                .wanted
                .push(skills::repo::upsert_by_name_tx(tx, name).await?);
        }

        skills::repo::replace_for_user_tx(tx, user_id, SkillKind::Offered, &result.offered)
            .await?;
        skills::repo::replace_for_user_tx(tx, user_id, SkillKind::Wanted, &result.wanted)
            .await?;
        Ok(result.sorted())
    }
}

#[async_trait]
impl SwapStore for PgStore {
    async fn create_user(
        &self,
        new: NewUser,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserProfile> {
        let mut tx = self.db.begin().await?;
        let user = users::repo::create_tx(&mut tx, &new).await?;
        let skills = Self::write_skills_tx(&mut tx, user.id, offered, wanted).await?;
        tx.commit().await?;

        debug!(user_id = %user.id, offered = skills.offered.len(), wanted = skills.wanted.len(), "user created");
        Ok(UserProfile::new(user, skills))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        users::repo::find_by_email(&self.db, email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        users::repo::find_by_id(&self.db, id).await
    }

    async fn list_public_users_excluding(&self, exclude: Uuid) -> StoreResult<Vec<UserProfile>> {
        let users = users::repo::list_public_excluding(&self.db, exclude).await?;
        self.with_skills(users).await
    }

    async fn replace_user_skills(
        &self,
        user_id: Uuid,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserSkills> {
        let mut tx = self.db.begin().await?;

        // lock the user row so concurrent replaces serialize
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound("User"));
        }

        let result = Self::write_skills_tx(&mut tx, user_id, offered, wanted).await?;

        sqlx::query("UPDATE users SET updated_at = now() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(%user_id, offered = result.offered.len(), wanted = result.wanted.len(), "skills replaced");
        Ok(result)
    }

    async fn search_users_by_skill(
        &self,
        query: &str,
        exclude: Option<Uuid>,
        threshold: f32,
    ) -> StoreResult<Vec<UserProfile>> {
        let users = users::repo::search_by_skill(&self.db, query, exclude, threshold).await?;
        self.with_skills(users).await
    }

    async fn has_pending_request(&self, requester_id: Uuid, receiver_id: Uuid) -> StoreResult<bool> {
        swaps::repo::has_pending(&self.db, requester_id, receiver_id).await
    }

    async fn create_swap_request(&self, new: NewSwapRequest) -> StoreResult<SwapRequest> {
        swaps::repo::create(&self.db, &new).await
    }

    async fn list_received_requests(&self, user_id: Uuid) -> StoreResult<Vec<SwapRequest>> {
        swaps::repo::list_received(&self.db, user_id).await
    }

    async fn list_sent_requests(&self, user_id: Uuid) -> StoreResult<Vec<SwapRequest>> {
        swaps::repo::list_sent(&self.db, user_id).await
    }

    async fn get_swap_request(&self, id: Uuid) -> StoreResult<Option<SwapRequest>> {
        swaps::repo::get(&self.db, id).await
    }

    async fn transition_swap_request(
        &self,
        id: Uuid,
        to: SwapStatus,
    ) -> StoreResult<Option<SwapRequest>> {
        swaps::repo::transition(&self.db, id, to).await
    }

    async fn log_admin_action(&self, entry: NewAdminLog) -> StoreResult<AdminLog> {
        admin::repo::insert(&self.db, &entry).await
    }
}
