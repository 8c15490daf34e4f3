//! Persistence for users and tasks.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use taskflow_shared::{Task, UserInfo};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username or email already taken")]
    Conflict,
    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// A stored account. The password is kept only as a bcrypt digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    fn into_user(self, id: u64) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: now(),
        }
    }
}

/// Storage backend shared by every request handler.
///
/// Task lookups always take the owner's id: a task that belongs to someone
/// else is reported exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: u64) -> Result<Option<User>, StoreError>;

    async fn create_task(&self, user_id: u64, description: String) -> Result<Task, StoreError>;
    /// Tasks created on `day` (UTC), ordered by id.
    async fn tasks_on(&self, user_id: u64, day: NaiveDate) -> Result<Vec<Task>, StoreError>;
    async fn task(&self, user_id: u64, id: u64) -> Result<Option<Task>, StoreError>;
    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;
    async fn delete_task(&self, task: &Task) -> Result<(), StoreError>;
}

/// Current time as an RFC 3339 UTC timestamp.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The day a task is listed under.
pub fn created_day(task: &Task) -> Result<NaiveDate, StoreError> {
    DateTime::parse_from_rfc3339(&task.created_at)
        .map(|at| taskflow_shared::task_day(&at))
        .map_err(|err| StoreError::Corrupt(format!("task {} created_at: {err}", task.id)))
}
