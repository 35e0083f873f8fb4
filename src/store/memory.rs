//! In-process user store.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{NewUser, StoreError, StoreResult, UserPatch, UserRecord, UserRepository};

/// Users kept in a concurrent map. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: DashMap<i64, UserRecord>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        let user = user.validate()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = UserRecord {
            id,
            name: user.name,
            email: user.email,
        };
        self.users.insert(id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(&id).map(|e| e.value().clone()))
    }

    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<UserRecord> {
        let patch = patch.validate()?;
        let mut entry = self.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
