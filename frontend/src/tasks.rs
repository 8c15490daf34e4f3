//! The task list for the selected day.
//!
//! [`TaskStore`] mirrors server responses into [`UiTask`]s. Each operation
//! awaits the network once and then applies its change to the list in a
//! single borrow, so operations issued back to back only interleave at that
//! await. Nothing is queued or cancelled; the last response to land wins.

use std::cell::RefCell;
use std::rc::Rc;

use taskflow_shared::{format_day, Task, TaskStatus, UpdateTaskRequest};

use crate::api::TaskApi;
use crate::error::ClientError;
use crate::gateway::Transport;
use crate::session::TokenProvider;

/// The day the board opens on. Uses the same UTC day the server files new
/// tasks under, so a task added now shows up when the day is reloaded.
pub fn today() -> String {
    format_day(taskflow_shared::today())
}

/// A task shaped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiTask {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

impl UiTask {
    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Done
        } else {
            TaskStatus::Pending
        }
    }
}

impl From<Task> for UiTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.description,
            completed: task.status == TaskStatus::Done,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListState {
    pub tasks: Vec<UiTask>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct TaskStore<T, P> {
    api: TaskApi<T>,
    tokens: Rc<P>,
    state: RefCell<TaskListState>,
}

/// Clears `loading` when dropped, whichever way the fetch ends.
struct LoadingGuard<'a> {
    state: &'a RefCell<TaskListState>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a RefCell<TaskListState>) -> Self {
        {
            let mut state = state.borrow_mut();
            state.loading = true;
            state.error = None;
        }
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().loading = false;
    }
}

impl<T: Transport, P: TokenProvider> TaskStore<T, P> {
    pub fn new(api: TaskApi<T>, tokens: Rc<P>) -> Self {
        Self {
            api,
            tokens,
            state: RefCell::new(TaskListState::default()),
        }
    }

    pub fn snapshot(&self) -> TaskListState {
        self.state.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<UiTask> {
        self.state.borrow().tasks.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Drops everything, e.g. after logout.
    pub fn clear(&self) {
        *self.state.borrow_mut() = TaskListState::default();
    }

    fn token(&self) -> Result<String, ClientError> {
        self.tokens.token().ok_or(ClientError::NotAuthenticated)
    }

    /// Replaces the list with the tasks of `date`. Failures never escape: they
    /// leave an empty list and a message in `error`.
    pub async fn fetch_tasks(&self, date: &str) {
        let _loading = LoadingGuard::begin(&self.state);

        let result = match self.token() {
            Ok(token) => self.api.list_tasks(&token, date).await,
            Err(err) => Err(err),
        };

        let mut state = self.state.borrow_mut();
        match result {
            Ok(response) => {
                state.tasks = response.tasks.into_iter().map(UiTask::from).collect();
                tracing::debug!(date, count = state.tasks.len(), "fetched tasks");
            }
            Err(err) => {
                tracing::warn!(date, error = %err, "failed to fetch tasks");
                state.error = Some(err.to_string());
                state.tasks.clear();
            }
        }
    }

    /// Creates a task from `title`. Blank titles are ignored.
    pub async fn add_task(&self, title: &str) -> Result<(), ClientError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(());
        }
        self.clear_error();

        let task = self
            .record(async {
                let token = self.token()?;
                self.api.create_task(&token, title).await
            })
            .await?
            .task;
        self.state.borrow_mut().tasks.push(UiTask::from(task));
        Ok(())
    }

    /// Flips a task between pending and done. Unknown ids are ignored.
    pub async fn toggle_task(&self, id: u64) -> Result<(), ClientError> {
        let Some(current) = self
            .state
            .borrow()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(UiTask::status)
        else {
            return Ok(());
        };
        self.clear_error();

        let changes = UpdateTaskRequest {
            description: None,
            status: Some(current.toggled()),
        };
        let task = self
            .record(async {
                let token = self.token()?;
                self.api.update_task(&token, id, &changes).await
            })
            .await?
            .task;

        // Located again by id: the list may have changed while the request was
        // in flight. If the task is gone the response is dropped.
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.tasks.iter_mut().find(|task| task.id == id) {
            *slot = UiTask::from(task);
        }
        Ok(())
    }

    pub async fn remove_task(&self, id: u64) -> Result<(), ClientError> {
        self.clear_error();
        self.record(async {
            let token = self.token()?;
            self.api.delete_task(&token, id).await
        })
        .await?;
        self.state.borrow_mut().tasks.retain(|task| task.id != id);
        Ok(())
    }

    fn clear_error(&self) {
        self.state.borrow_mut().error = None;
    }

    /// Runs a mutating call, copying any failure into `error` before handing
    /// it back to the caller.
    async fn record<R>(
        &self,
        call: impl std::future::Future<Output = Result<R, ClientError>>,
    ) -> Result<R, ClientError> {
        call.await.inspect_err(|err| {
            tracing::warn!(error = %err, "task operation failed");
            self.state.borrow_mut().error = Some(err.to_string());
        })
    }
}
