use std::rc::Rc;

use taskflow_shared::{
    CreateTaskRequest, MessageResponse, TaskListResponse, TaskResponse, UpdateTaskRequest,
};

use crate::error::ClientError;
use crate::gateway::{Gateway, Method, RequestOptions, Transport};

/// Task endpoints. Every call carries the caller's bearer token.
pub struct TaskApi<T> {
    gateway: Rc<Gateway<T>>,
}

impl<T> Clone for TaskApi<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: Rc::clone(&self.gateway),
        }
    }
}

impl<T: Transport> TaskApi<T> {
    pub fn new(gateway: Rc<Gateway<T>>) -> Self {
        Self { gateway }
    }

    /// Lists the tasks of one day. `date` is passed through as `YYYY-MM-DD`.
    pub async fn list_tasks(&self, token: &str, date: &str) -> Result<TaskListResponse, ClientError> {
        let options = RequestOptions::new(Method::Get)
            .bearer(token)
            .param("date", date);
        self.gateway.request("/tasks", options).await
    }

    pub async fn create_task(
        &self,
        token: &str,
        description: &str,
    ) -> Result<TaskResponse, ClientError> {
        let body = CreateTaskRequest {
            description: description.to_string(),
        };
        let options = RequestOptions::new(Method::Post).bearer(token).json(&body)?;
        self.gateway.request("/tasks", options).await
    }

    pub async fn update_task(
        &self,
        token: &str,
        id: u64,
        changes: &UpdateTaskRequest,
    ) -> Result<TaskResponse, ClientError> {
        let options = RequestOptions::new(Method::Put).bearer(token).json(changes)?;
        self.gateway.request(&format!("/tasks/{id}"), options).await
    }

    pub async fn delete_task(&self, token: &str, id: u64) -> Result<MessageResponse, ClientError> {
        let options = RequestOptions::new(Method::Delete).bearer(token);
        self.gateway.request(&format!("/tasks/{id}"), options).await
    }
}
