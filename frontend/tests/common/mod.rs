#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;
use taskflow_web::api::{AuthApi, TaskApi};
use taskflow_web::{
    ClientError, Gateway, HttpRequest, HttpResponse, MemoryStorage, SessionStore, TaskStore,
    Transport,
};

pub const BASE: &str = "http://api.test";

/// Replays queued responses in order and remembers every request it saw.
///
/// A request can be held in flight with [`ScriptedTransport::hold_next`]:
/// its response is taken when the request is sent but only delivered once
/// the returned gate is opened.
#[derive(Default)]
pub struct ScriptedTransport {
    requests: RefCell<Vec<HttpRequest>>,
    responses: RefCell<VecDeque<Result<HttpResponse, ClientError>>>,
    gate: RefCell<Option<Rc<Notify>>>,
}

impl ScriptedTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: Value) {
        self.reply_raw(status, status_text(status), &body.to_string());
    }

    pub fn reply_raw(&self, status: u16, status_text: &str, body: &str) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, err: ClientError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    /// Holds the next request until `notify_one` is called on the result.
    pub fn hold_next(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.borrow_mut().push(request);
        let response = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted response".to_string())));
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        response
    }
}

pub type TestSession = SessionStore<Rc<ScriptedTransport>, Rc<MemoryStorage>>;
pub type TestTasks = TaskStore<Rc<ScriptedTransport>, TestSession>;

pub struct Harness {
    pub transport: Rc<ScriptedTransport>,
    pub storage: Rc<MemoryStorage>,
    pub session: Rc<TestSession>,
    pub tasks: TestTasks,
}

impl Harness {
    pub fn new(storage: MemoryStorage) -> Self {
        let transport = ScriptedTransport::new();
        let storage = Rc::new(storage);
        let gateway = Rc::new(Gateway::new(BASE, Rc::clone(&transport)));
        let session = Rc::new(SessionStore::restore(
            AuthApi::new(Rc::clone(&gateway)),
            Rc::clone(&storage),
        ));
        let tasks = TaskStore::new(TaskApi::new(gateway), Rc::clone(&session));
        Self {
            transport,
            storage,
            session,
            tasks,
        }
    }

    pub fn logged_out() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn logged_in() -> Self {
        Self::new(MemoryStorage::with_entries([
            ("taskflow_token", "tok-123"),
            ("taskflow_username", "alice"),
        ]))
    }
}

pub fn task_json(id: u64, description: &str, status: &str) -> Value {
    json!({
        "id": id,
        "description": description,
        "status": status,
        "user_id": 7,
        "created_at": "2024-01-01T08:00:00Z",
        "updated_at": "2024-01-01T08:00:00Z"
    })
}

pub fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().expect("request had no body"))
        .expect("request body was not JSON")
}
