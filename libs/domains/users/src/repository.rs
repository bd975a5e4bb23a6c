use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` on a taken address
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Lookup by (already lowercased) email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn get_by_reset_token_hash(&self, token_hash: &str) -> UserResult<Option<User>>;

    /// Newest first, paginated
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Number of users matching the filter, ignoring pagination
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Persist every mutable field of `user`
    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_reset_token_hash(&self, token_hash: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}
