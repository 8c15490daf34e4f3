use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use chrono::NaiveDate;
use taskflow_shared::Task;

use super::{created_day, now, NewUser, Store, StoreError, User};

const NEXT_USER_ID: &str = "users:next_id";
const NEXT_TASK_ID: &str = "tasks:next_id";

fn user_key(id: u64) -> String {
    format!("user:{id}")
}

fn username_key(username: &str) -> String {
    format!("users:by_name:{username}")
}

fn email_key(email: &str) -> String {
    format!("users:by_email:{email}")
}

fn task_key(id: u64) -> String {
    format!("task:{id}")
}

fn day_index_key(user_id: u64, day: NaiveDate) -> String {
    format!("user:{user_id}:tasks:{}", day.format("%Y-%m-%d"))
}

/// Redis layout:
///
/// - `user:{id}` / `task:{id}` hold JSON records,
/// - `users:by_name:{name}` and `users:by_email:{email}` map to a user id and
///   are claimed with `SET NX`,
/// - `user:{uid}:tasks:{YYYY-MM-DD}` is the set of task ids created that day.
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::open(url)?,
        })
    }

    async fn conn(&self) -> Result<MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

async fn load_user(conn: &mut MultiplexedConnection, id: u64) -> Result<Option<User>, StoreError> {
    let json: Option<String> = conn.get(user_key(id)).await?;
    Ok(json.map(|json| serde_json::from_str(&json)).transpose()?)
}

async fn load_task(conn: &mut MultiplexedConnection, id: u64) -> Result<Option<Task>, StoreError> {
    let json: Option<String> = conn.get(task_key(id)).await?;
    Ok(json.map(|json| serde_json::from_str(&json)).transpose()?)
}

#[async_trait]
impl Store for RedisStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.conn().await?;

        let id: u64 = conn.incr(NEXT_USER_ID, 1).await?;
        let name_claimed: bool = conn.set_nx(username_key(&user.username), id).await?;
        if !name_claimed {
            return Err(StoreError::Conflict);
        }
        let email_claimed: bool = conn.set_nx(email_key(&user.email), id).await?;
        if !email_claimed {
            let _: () = conn.del(username_key(&user.username)).await?;
            return Err(StoreError::Conflict);
        }

        let user = user.into_user(id);
        let _: () = conn.set(user_key(id), serde_json::to_string(&user)?).await?;
        tracing::debug!(user_id = id, "stored user");
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        let id: Option<u64> = conn.get(username_key(username)).await?;
        match id {
            Some(id) => load_user(&mut conn, id).await,
            None => Ok(None),
        }
    }

    async fn user_by_id(&self, id: u64) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn().await?;
        load_user(&mut conn, id).await
    }

    async fn create_task(&self, user_id: u64, description: String) -> Result<Task, StoreError> {
        let mut conn = self.conn().await?;

        let id: u64 = conn.incr(NEXT_TASK_ID, 1).await?;
        let task = Task::new(id, user_id, description, now());
        let day = created_day(&task)?;

        let _: () = conn.set(task_key(id), serde_json::to_string(&task)?).await?;
        let _: () = conn.sadd(day_index_key(user_id, day), id).await?;
        Ok(task)
    }

    async fn tasks_on(&self, user_id: u64, day: NaiveDate) -> Result<Vec<Task>, StoreError> {
        let mut conn = self.conn().await?;

        let mut ids: Vec<u64> = conn.smembers(day_index_key(user_id, day)).await?;
        ids.sort_unstable();

        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            // Index entries can outlive a task deleted by another client.
            if let Some(task) = load_task(&mut conn, id).await? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    async fn task(&self, user_id: u64, id: u64) -> Result<Option<Task>, StoreError> {
        let mut conn = self.conn().await?;
        Ok(load_task(&mut conn, id)
            .await?
            .filter(|task| task.user_id == user_id))
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let _: () = conn.set(task_key(task.id), serde_json::to_string(task)?).await?;
        Ok(())
    }

    async fn delete_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let day = created_day(task)?;
        let _: () = conn.del(task_key(task.id)).await?;
        let _: () = conn.srem(day_index_key(task.user_id, day), task.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_documented_layout() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(user_key(3), "user:3");
        assert_eq!(task_key(11), "task:11");
        assert_eq!(username_key("alice"), "users:by_name:alice");
        assert_eq!(email_key("a@x.io"), "users:by_email:a@x.io");
        assert_eq!(day_index_key(3, day), "user:3:tasks:2024-01-05");
    }

    #[test]
    fn open_rejects_malformed_urls() {
        assert!(matches!(
            RedisStore::open("not a url"),
            Err(StoreError::Redis(_))
        ));
    }
}
