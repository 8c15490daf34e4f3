use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use taskflow_shared::Task;

use super::{created_day, now, NewUser, Store, StoreError, User};

/// Process-local store. Used by the test suites and by `STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<u64, User>,
    tasks: BTreeMap<u64, Task>,
    last_user_id: u64,
    last_task_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock();
        let taken = inner
            .users
            .values()
            .any(|existing| existing.username == user.username || existing.email == user.email);
        if taken {
            return Err(StoreError::Conflict);
        }

        inner.last_user_id += 1;
        let user = user.into_user(inner.last_user_id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn user_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn create_task(&self, user_id: u64, description: String) -> Result<Task, StoreError> {
        let mut inner = self.lock();
        inner.last_task_id += 1;
        let task = Task::new(inner.last_task_id, user_id, description, now());
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn tasks_on(&self, user_id: u64, day: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let inner = self.lock();
        let mut tasks = Vec::new();
        for task in inner.tasks.values().filter(|task| task.user_id == user_id) {
            if created_day(task)? == day {
                tasks.push(task.clone());
            }
        }
        Ok(tasks)
    }

    async fn task(&self, user_id: u64, id: u64) -> Result<Option<Task>, StoreError> {
        Ok(self
            .lock()
            .tasks
            .get(&id)
            .filter(|task| task.user_id == user_id)
            .cloned())
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        self.lock().tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete_task(&self, task: &Task) -> Result<(), StoreError> {
        self.lock().tasks.remove(&task.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn usernames_and_emails_are_unique() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("alice", "a@x.io")).await.unwrap();
        assert_eq!(alice.id, 1);

        assert!(matches!(
            store.create_user(new_user("alice", "other@x.io")).await,
            Err(StoreError::Conflict)
        ));
        assert!(matches!(
            store.create_user(new_user("bob", "a@x.io")).await,
            Err(StoreError::Conflict)
        ));

        let bob = store.create_user(new_user("bob", "b@x.io")).await.unwrap();
        assert_eq!(bob.id, 2);
        assert_eq!(store.user_by_username("bob").await.unwrap(), Some(bob));
    }

    #[tokio::test]
    async fn tasks_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let task = store.create_task(1, "mine".to_string()).await.unwrap();

        assert_eq!(store.task(1, task.id).await.unwrap(), Some(task.clone()));
        assert_eq!(store.task(2, task.id).await.unwrap(), None);

        let today = Utc::now().date_naive();
        assert_eq!(store.tasks_on(1, today).await.unwrap(), vec![task]);
        assert!(store.tasks_on(2, today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_filters_by_creation_day() {
        let store = MemoryStore::new();
        let mut old = store.create_task(1, "old".to_string()).await.unwrap();
        old.created_at = "2020-01-01T10:00:00Z".to_string();
        store.save_task(&old).await.unwrap();
        let fresh = store.create_task(1, "fresh".to_string()).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(store.tasks_on(1, day).await.unwrap(), vec![old.clone()]);
        assert_eq!(
            store.tasks_on(1, Utc::now().date_naive()).await.unwrap(),
            vec![fresh]
        );

        store.delete_task(&old).await.unwrap();
        assert!(store.tasks_on(1, day).await.unwrap().is_empty());
    }
}
