use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, StoreResult, SwapStore};
use crate::{
    admin::repo_types::{AdminLog, NewAdminLog},
    skills::{
        repo_types::{Skill, UserSkills},
        similarity::similarity,
    },
    swaps::repo_types::{NewSwapRequest, SwapRequest, SwapStatus},
    users::repo_types::{NewUser, Role, User, UserProfile},
};

/// Process-local store with the same observable rules as [`super::postgres::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    skills: Vec<Skill>,
    offered: HashMap<Uuid, Vec<Uuid>>,
    wanted: HashMap<Uuid, Vec<Uuid>>,
    requests: Vec<SwapRequest>,
    admin_logs: Vec<AdminLog>,
}

impl Inner {
    fn skill(&self, id: &Uuid) -> Option<Skill> {
        self.skills.iter().find(|s| s.id == *id).cloned()
    }

    fn skills_of(&self, user_id: Uuid) -> UserSkills {
        let resolve = |ids: Option<&Vec<Uuid>>| -> Vec<Skill> {
            ids.map(|ids| ids.iter().filter_map(|id| self.skill(id)).collect())
                .unwrap_or_default()
        };
        UserSkills {
            offered: resolve(self.offered.get(&user_id)),
            wanted: resolve(self.wanted.get(&user_id)),
        }
        .sorted()
    }

    fn profile(&self, user: &User) -> UserProfile {
        UserProfile::new(user.clone(), self.skills_of(user.id))
    }

    fn upsert_skill(&mut self, name: &str) -> Skill {
        let lower = name.to_lowercase();
        if let Some(s) = self.skills.iter().find(|s| s.name.to_lowercase() == lower) {
            return s.clone();
        }
        let skill = Skill {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.skills.push(skill.clone());
        skill
    }

    fn write_skills(&mut self, user_id: Uuid, offered: &[String], wanted: &[String]) -> UserSkills {
        let offered: Vec<Skill> = offered.iter().map(|n| self.upsert_skill(n)).collect();
        let wanted: Vec<Skill> = wanted.iter().map(|n| self.upsert_skill(n)).collect();
        self.offered
            .insert(user_id, offered.iter().map(|s| s.id).collect());
        self.wanted
            .insert(user_id, wanted.iter().map(|s| s.id).collect());
        UserSkills { offered, wanted }.sorted()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SwapStore for MemoryStore {
    async fn create_user(
        &self,
        new: NewUser,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserProfile> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            location: new.location,
            availability: new.availability,
            is_public: new.is_public,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        let skills = inner.write_skills(user.id, offered, wanted);
        inner.users.push(user.clone());
        Ok(UserProfile::new(user, skills))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_public_users_excluding(&self, exclude: Uuid) -> StoreResult<Vec<UserProfile>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| u.is_public && u.id != exclude)
            .map(|u| inner.profile(u))
            .collect())
    }

    async fn replace_user_skills(
        &self,
        user_id: Uuid,
        offered: &[String],
        wanted: &[String],
    ) -> StoreResult<UserSkills> {
        let mut inner = self.inner.lock().await;
        let idx = inner
            .users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or(StoreError::NotFound("User"))?;

        let skills = inner.write_skills(user_id, offered, wanted);
        inner.users[idx].updated_at = OffsetDateTime::now_utc();
        Ok(skills)
    }

    async fn search_users_by_skill(
        &self,
        query: &str,
        exclude: Option<Uuid>,
        threshold: f32,
    ) -> StoreResult<Vec<UserProfile>> {
        let inner = self.inner.lock().await;
        let mut scored: Vec<(f32, UserProfile)> = inner
            .users
            .iter()
            .filter(|u| u.is_public && Some(u.id) != exclude)
            .filter_map(|u| {
                let profile = inner.profile(u);
                let best = profile
                    .skills_offered
                    .iter()
                    .chain(profile.skills_wanted.iter())
                    .map(|s| similarity(&s.name, query))
                    .fold(0.0_f32, f32::max);
                (best > threshold).then_some((best, profile))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().map(|(_, p)| p).collect())
    }

    async fn has_pending_request(&self, requester_id: Uuid, receiver_id: Uuid) -> StoreResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.requests.iter().any(|r| {
            r.requester_id == requester_id
                && r.receiver_id == receiver_id
                && r.status == SwapStatus::Pending
        }))
    }

    async fn create_swap_request(&self, new: NewSwapRequest) -> StoreResult<SwapRequest> {
        let mut inner = self.inner.lock().await;
        let duplicate = inner.requests.iter().any(|r| {
            r.requester_id == new.requester_id
                && r.receiver_id == new.receiver_id
                && r.status == SwapStatus::Pending
        });
        if duplicate {
            return Err(StoreError::PendingRequestExists);
        }
        let now = OffsetDateTime::now_utc();
        let req = SwapRequest {
            id: Uuid::new_v4(),
            requester_id: new.requester_id,
            receiver_id: new.receiver_id,
            offered_skill: new.offered_skill,
            wanted_skill: new.wanted_skill,
            message: new.message,
            status: SwapStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.requests.push(req.clone());
        Ok(req)
    }

    async fn list_received_requests(&self, user_id: Uuid) -> StoreResult<Vec<SwapRequest>> {
        let inner = self.inner.lock().await;
        // insertion order reversed is newest first
        Ok(inner
            .requests
            .iter()
            .rev()
            .filter(|r| r.receiver_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_sent_requests(&self, user_id: Uuid) -> StoreResult<Vec<SwapRequest>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .requests
            .iter()
            .rev()
            .filter(|r| r.requester_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_swap_request(&self, id: Uuid) -> StoreResult<Option<SwapRequest>> {
        let inner = self.inner.lock().await;
        Ok(inner.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn transition_swap_request(
        &self,
        id: Uuid,
        to: SwapStatus,
    ) -> StoreResult<Option<SwapRequest>> {
        let mut inner = self.inner.lock().await;
        let Some(req) = inner
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == SwapStatus::Pending)
        else {
            return Ok(None);
        };
        req.status = to;
        req.updated_at = OffsetDateTime::now_utc();
        Ok(Some(req.clone()))
    }

    async fn log_admin_action(&self, entry: NewAdminLog) -> StoreResult<AdminLog> {
        let mut inner = self.inner.lock().await;
        for id in [entry.admin_id, entry.target_user_id] {
            if !inner.users.iter().any(|u| u.id == id) {
                return Err(StoreError::NotFound("User"));
            }
        }
        let log = AdminLog {
            id: Uuid::new_v4(),
            admin_id: entry.admin_id,
            target_user_id: entry.target_user_id,
            action: entry.action,
            message: entry.message,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.admin_logs.push(log.clone());
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::repo_types::AdminAction;

    fn new_user(name: &str, is_public: bool) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".into(),
            location: String::new(),
            availability: String::new(),
            is_public,
        }
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    async fn add_user(store: &MemoryStore, name: &str, is_public: bool) -> User {
        store
            .create_user(new_user(name, is_public), &[], &[])
            .await
            .unwrap()
            .user
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_side_effects() {
        let store = MemoryStore::new();
        add_user(&store, "ada", true).await;
        let err = store
            .create_user(new_user("ada", true), &names(&["Harp"]), &names(&["Oboe"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let inner = store.inner.lock().await;
        assert_eq!(inner.users.len(), 1);
        assert!(inner.skills.is_empty());
    }

    #[tokio::test]
    async fn create_user_stores_skills_sorted_by_name() {
        let store = MemoryStore::new();
        let profile = store
            .create_user(
                new_user("ada", true),
                &names(&["Rust", "Chess"]),
                &names(&["Piano", "Baking"]),
            )
            .await
            .unwrap();
        let offered: Vec<&str> = profile.skills_offered.iter().map(|s| s.name.as_str()).collect();
        let wanted: Vec<&str> = profile.skills_wanted.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(offered, vec!["Chess", "Rust"]);
        assert_eq!(wanted, vec!["Baking", "Piano"]);

        let replaced = store
            .replace_user_skills(profile.user.id, &names(&["Zither", "Abacus"]), &[])
            .await
            .unwrap();
        assert_eq!(replaced.offered[0].name, "Abacus");
        assert_eq!(replaced.offered[1].name, "Zither");
    }

    #[tokio::test]
    async fn skills_are_shared_case_insensitively_and_replaced() {
        let store = MemoryStore::new();
        let a = add_user(&store, "a", true).await;
        let b = add_user(&store, "b", true).await;

        let sa = store
            .replace_user_skills(a.id, &names(&["Rust"]), &names(&["Piano"]))
            .await
            .unwrap();
        let sb = store
            .replace_user_skills(b.id, &names(&["rust"]), &[])
            .await
            .unwrap();
        assert_eq!(sa.offered[0].id, sb.offered[0].id);
        assert_eq!(sb.offered[0].name, "Rust");

        let replaced = store
            .replace_user_skills(a.id, &[], &names(&["Chess"]))
            .await
            .unwrap();
        assert!(replaced.offered.is_empty());
        let profiles = store.list_public_users_excluding(b.id).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].skills_offered.is_empty());
        assert_eq!(profiles[0].skills_wanted[0].name, "Chess");
    }

    #[tokio::test]
    async fn replace_for_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .replace_user_skills(Uuid::new_v4(), &names(&["Rust"]), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("User")));
    }

    #[tokio::test]
    async fn search_filters_by_threshold_visibility_and_orders_by_best_match() {
        let store = MemoryStore::new();
        // weaker matches are inserted first so ordering comes from the score
        let typo = add_user(&store, "typo", true).await;
        let near_miss = add_user(&store, "nearmiss", true).await;
        let hidden = add_user(&store, "hidden", false).await;
        let other = add_user(&store, "other", true).await;
        let exact = add_user(&store, "exact", true).await;

        store
            .replace_user_skills(typo.id, &[], &names(&["Guitr"]))
            .await
            .unwrap();
        // 7/27 trigrams shared with "guitar": above zero, below 0.3
        store
            .replace_user_skills(near_miss.id, &names(&["Guitar Hero Deluxe Edition"]), &[])
            .await
            .unwrap();
        store
            .replace_user_skills(hidden.id, &names(&["Guitar"]), &[])
            .await
            .unwrap();
        store
            .replace_user_skills(other.id, &names(&["Cooking"]), &[])
            .await
            .unwrap();
        store
            .replace_user_skills(exact.id, &names(&["Guitar"]), &[])
            .await
            .unwrap();

        let score = similarity("Guitar Hero Deluxe Edition", "guitar");
        assert!(score > 0.0 && score < 0.3, "{score}");

        let found = store.search_users_by_skill("guitar", None, 0.3).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|p| p.user.id).collect();
        assert_eq!(ids, vec![exact.id, typo.id]);

        let found = store.search_users_by_skill("guitar", None, 0.2).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|p| p.user.id).collect();
        assert_eq!(ids, vec![exact.id, typo.id, near_miss.id]);

        let found = store
            .search_users_by_skill("guitar", Some(exact.id), 0.3)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user.id, typo.id);
    }

    #[tokio::test]
    async fn one_pending_request_per_pair_and_single_transition() {
        let store = MemoryStore::new();
        let a = add_user(&store, "a", true).await;
        let b = add_user(&store, "b", true).await;
        let new = NewSwapRequest {
            requester_id: a.id,
            receiver_id: b.id,
            offered_skill: "Rust".into(),
            wanted_skill: "Piano".into(),
            message: String::new(),
        };

        let req = store.create_swap_request(new.clone()).await.unwrap();
        assert!(store.has_pending_request(a.id, b.id).await.unwrap());
        assert!(!store.has_pending_request(b.id, a.id).await.unwrap());
        assert!(matches!(
            store.create_swap_request(new.clone()).await.unwrap_err(),
            StoreError::PendingRequestExists
        ));

        let accepted = store
            .transition_swap_request(req.id, SwapStatus::Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, SwapStatus::Accepted);
        assert!(store
            .transition_swap_request(req.id, SwapStatus::Declined)
            .await
            .unwrap()
            .is_none());

        // once settled, the pair may propose again
        store.create_swap_request(new).await.unwrap();
        assert_eq!(store.list_received_requests(b.id).await.unwrap().len(), 2);
        assert_eq!(store.list_sent_requests(a.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn admin_log_requires_known_users() {
        let store = MemoryStore::new();
        let admin = add_user(&store, "admin", false).await;
        let target = add_user(&store, "target", true).await;
        let log = store
            .log_admin_action(NewAdminLog {
                admin_id: admin.id,
                target_user_id: target.id,
                action: AdminAction::Ban,
                message: "spam".into(),
            })
            .await
            .unwrap();
        assert_eq!(log.action, AdminAction::Ban);

        let err = store
            .log_admin_action(NewAdminLog {
                admin_id: admin.id,
                target_user_id: Uuid::new_v4(),
                action: AdminAction::RejectDescription,
                message: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("User")));
    }
}
