//! The sauron application: login, registration and the task board.

use std::rc::Rc;

use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use web_sys::window;

use crate::api::{AuthApi, TaskApi};
use crate::config::api_base;
use crate::fetch::FetchTransport;
use crate::gateway::Gateway;
use crate::router::{guard, Route};
use crate::session::{SessionStore, TokenProvider};
use crate::storage::BrowserStorage;
use crate::tasks::{TaskStore, UiTask};

type Session = SessionStore<FetchTransport, BrowserStorage>;
type Tasks = TaskStore<FetchTransport, Session>;

#[derive(Debug, Clone)]
pub enum Msg {
    NavigateTo(Route),

    SetLoginUsername(String),
    SetLoginPassword(String),
    SubmitLogin,
    LoginFinished(Result<(), String>),

    SetRegisterUsername(String),
    SetRegisterPassword(String),
    SetRegisterEmail(String),
    SubmitRegister,
    RegisterFinished(Result<String, String>),

    Logout,

    SetDate(String),
    LoadTasks,
    SetNewTaskTitle(String),
    AddTask,
    ToggleTask(u64),
    RemoveTask(u64),
    // A store operation finished; re-render from the store.
    TasksChanged,
}

#[derive(Clone)]
pub struct App {
    route: Route,
    session: Rc<Session>,
    tasks: Rc<Tasks>,
    date: String,
    login_username: String,
    login_password: String,
    register_username: String,
    register_password: String,
    register_email: String,
    new_task_title: String,
    submitting: bool,
    form_error: Option<String>,
    notice: Option<String>,
}

impl App {
    pub fn new() -> Self {
        let gateway = Rc::new(Gateway::new(api_base(), FetchTransport));
        let session = Rc::new(SessionStore::restore(
            AuthApi::new(Rc::clone(&gateway)),
            BrowserStorage,
        ));
        let tasks = Rc::new(TaskStore::new(TaskApi::new(gateway), Rc::clone(&session)));
        Self {
            route: Route::Login,
            session,
            tasks,
            date: crate::tasks::today(),
            login_username: String::new(),
            login_password: String::new(),
            register_username: String::new(),
            register_password: String::new(),
            register_email: String::new(),
            new_task_title: String::new(),
            submitting: false,
            form_error: None,
            notice: None,
        }
    }

    fn navigate(&mut self, target: Route) -> Cmd<Msg> {
        let route = guard(target, self.session.is_logged_in());
        self.route = route;
        self.form_error = None;

        if let Some(history) = window().and_then(|w| w.history().ok()) {
            let _ = history.push_state_with_url(
                &wasm_bindgen::JsValue::NULL,
                "",
                Some(route.to_path()),
            );
        }

        if route == Route::TaskBoard {
            Cmd::new(async { Msg::LoadTasks })
        } else {
            Cmd::none()
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for App {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        let path = window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string());
        self.navigate(Route::from_path(&path))
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::NavigateTo(route) => {
                self.notice = None;
                self.navigate(route)
            }
            Msg::SetLoginUsername(value) => {
                self.login_username = value;
                Cmd::none()
            }
            Msg::SetLoginPassword(value) => {
                self.login_password = value;
                Cmd::none()
            }
            Msg::SubmitLogin => {
                if self.submitting {
                    return Cmd::none();
                }
                self.submitting = true;
                self.form_error = None;
                let session = Rc::clone(&self.session);
                let username = self.login_username.clone();
                let password = self.login_password.clone();
                Cmd::new(async move {
                    let result = session
                        .login(&username, &password)
                        .await
                        .map_err(|err| err.to_string());
                    Msg::LoginFinished(result)
                })
            }
            Msg::LoginFinished(result) => {
                self.submitting = false;
                match result {
                    Ok(()) => {
                        self.login_password.clear();
                        self.notice = None;
                        self.navigate(Route::TaskBoard)
                    }
                    Err(message) => {
                        self.form_error = Some(message);
                        Cmd::none()
                    }
                }
            }
            Msg::SetRegisterUsername(value) => {
                self.register_username = value;
                Cmd::none()
            }
            Msg::SetRegisterPassword(value) => {
                self.register_password = value;
                Cmd::none()
            }
            Msg::SetRegisterEmail(value) => {
                self.register_email = value;
                Cmd::none()
            }
            Msg::SubmitRegister => {
                if self.submitting {
                    return Cmd::none();
                }
                self.submitting = true;
                self.form_error = None;
                let session = Rc::clone(&self.session);
                let username = self.register_username.clone();
                let password = self.register_password.clone();
                let email = self.register_email.clone();
                Cmd::new(async move {
                    let result = session
                        .auth_api()
                        .register(&username, &password, &email)
                        .await
                        .map(|response| response.user.username)
                        .map_err(|err| err.to_string());
                    Msg::RegisterFinished(result)
                })
            }
            Msg::RegisterFinished(result) => {
                self.submitting = false;
                match result {
                    Ok(username) => {
                        self.login_username = username;
                        self.register_password.clear();
                        let cmd = self.navigate(Route::Login);
                        self.notice = Some("Account created, please log in.".to_string());
                        cmd
                    }
                    Err(message) => {
                        self.form_error = Some(message);
                        Cmd::none()
                    }
                }
            }
            Msg::Logout => {
                self.session.logout();
                self.tasks.clear();
                self.navigate(Route::Login)
            }
            Msg::SetDate(date) => {
                self.date = date;
                Cmd::new(async { Msg::LoadTasks })
            }
            Msg::LoadTasks => {
                let tasks = Rc::clone(&self.tasks);
                let date = self.date.clone();
                Cmd::new(async move {
                    tasks.fetch_tasks(&date).await;
                    Msg::TasksChanged
                })
            }
            Msg::SetNewTaskTitle(value) => {
                self.new_task_title = value;
                Cmd::none()
            }
            Msg::AddTask => {
                let title = std::mem::take(&mut self.new_task_title);
                if title.trim().is_empty() {
                    return Cmd::none();
                }
                let tasks = Rc::clone(&self.tasks);
                Cmd::new(async move {
                    // The store keeps the error for display; nothing else to do here.
                    let _ = tasks.add_task(&title).await;
                    Msg::TasksChanged
                })
            }
            Msg::ToggleTask(id) => {
                let tasks = Rc::clone(&self.tasks);
                Cmd::new(async move {
                    let _ = tasks.toggle_task(id).await;
                    Msg::TasksChanged
                })
            }
            Msg::RemoveTask(id) => {
                let confirmed = window()
                    .and_then(|w| w.confirm_with_message("Delete this task?").ok())
                    .unwrap_or(false);
                if !confirmed {
                    return Cmd::none();
                }
                let tasks = Rc::clone(&self.tasks);
                Cmd::new(async move {
                    let _ = tasks.remove_task(id).await;
                    Msg::TasksChanged
                })
            }
            Msg::TasksChanged => Cmd::none(),
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [
                self.view_header(),
                div(
                    [class("max-w-3xl mx-auto px-6 py-8")],
                    [match self.route {
                        Route::Login => self.view_login(),
                        Route::Register => self.view_register(),
                        Route::TaskBoard => self.view_board(),
                    }],
                ),
            ],
        )
    }
}

impl App {
    fn view_header(&self) -> Node<Msg> {
        header([class("bg-ctp-mantle shadow-lg border-b border-ctp-surface0")], [
            div([class("max-w-3xl mx-auto px-6 py-4 flex items-center justify-between")], [
                h1([class("text-2xl font-bold text-ctp-text")], [text("TaskFlow")]),
                if self.session.is_logged_in() {
                    div([class("flex items-center space-x-4")], [
                        span([class("text-ctp-subtext0")], [text(self.session.username())]),
                        button([
                            on_click(|_| Msg::Logout),
                            class("px-3 py-2 rounded-md text-sm font-medium text-ctp-subtext0 hover:text-ctp-text hover:bg-ctp-surface0"),
                        ], [text("Log out")]),
                    ])
                } else {
                    span([], [])
                },
            ]),
        ])
    }

    fn nav_link(&self, label: &str, route: Route) -> Node<Msg> {
        a([
            href(route.to_path()),
            on_click(move |event| {
                event.prevent_default();
                Msg::NavigateTo(route)
            }),
            class("text-ctp-blue hover:text-ctp-sapphire font-medium"),
        ], [text(label)])
    }

    fn view_banner(&self, message: &Option<String>, color: &str) -> Node<Msg> {
        match message {
            Some(message) => div([class(&format!(
                "mb-4 px-4 py-3 rounded-md text-sm {}",
                color
            ))], [text(message)]),
            None => span([], []),
        }
    }

    fn text_field(
        &self,
        kind: &str,
        hint: &str,
        current: &str,
        on_change: fn(String) -> Msg,
    ) -> Node<Msg> {
        input([
            r#type(kind),
            placeholder(hint),
            value(current),
            on_input(move |event| on_change(event.value())),
            class("w-full px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent"),
        ], [])
    }

    fn submit_button(&self, label: &str, msg: Msg) -> Node<Msg> {
        button([
            on_click(move |_| msg.clone()),
            disabled(self.submitting),
            class("w-full bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
        ], [text(if self.submitting { "Please wait..." } else { label })])
    }

    fn view_login(&self) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-lg shadow-lg p-8 border border-ctp-surface1 space-y-4")], [
            h2([class("text-2xl font-bold text-ctp-text")], [text("Log in")]),
            self.view_banner(&self.notice, "bg-ctp-green/20 text-ctp-green"),
            self.view_banner(&self.form_error, "bg-ctp-red/20 text-ctp-red"),
            self.text_field("text", "Username", &self.login_username, Msg::SetLoginUsername),
            self.text_field("password", "Password", &self.login_password, Msg::SetLoginPassword),
            self.submit_button("Log in", Msg::SubmitLogin),
            p([class("text-sm text-ctp-subtext0")], [
                text("No account yet? "),
                self.nav_link("Register", Route::Register),
            ]),
        ])
    }

    fn view_register(&self) -> Node<Msg> {
        div([class("bg-ctp-surface0 rounded-lg shadow-lg p-8 border border-ctp-surface1 space-y-4")], [
            h2([class("text-2xl font-bold text-ctp-text")], [text("Create an account")]),
            self.view_banner(&self.form_error, "bg-ctp-red/20 text-ctp-red"),
            self.text_field("text", "Username", &self.register_username, Msg::SetRegisterUsername),
            self.text_field("email", "Email", &self.register_email, Msg::SetRegisterEmail),
            self.text_field("password", "Password", &self.register_password, Msg::SetRegisterPassword),
            self.submit_button("Register", Msg::SubmitRegister),
            p([class("text-sm text-ctp-subtext0")], [
                text("Already registered? "),
                self.nav_link("Log in", Route::Login),
            ]),
        ])
    }

    fn view_board(&self) -> Node<Msg> {
        let state = self.tasks.snapshot();
        let done = state.tasks.iter().filter(|t| t.completed).count();

        div([class("bg-ctp-surface0 rounded-lg shadow-lg p-6 border border-ctp-surface1")], [
            div([class("flex items-center justify-between mb-6")], [
                h2([class("text-2xl font-bold text-ctp-text")], [text("Tasks")]),
                input([
                    r#type("date"),
                    value(&self.date),
                    on_input(|event| Msg::SetDate(event.value())),
                    class("px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text"),
                ], []),
            ]),
            self.view_banner(&state.error, "bg-ctp-red/20 text-ctp-red"),
            div([class("flex gap-2 mb-6")], [
                input([
                    r#type("text"),
                    placeholder("What needs doing?"),
                    value(&self.new_task_title),
                    on_input(|event| Msg::SetNewTaskTitle(event.value())),
                    class("flex-1 px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                ], []),
                button([
                    on_click(|_| Msg::AddTask),
                    class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
                ], [text("Add")]),
            ]),
            if state.loading {
                div([class("text-center py-10 text-ctp-subtext0 italic")], [text("Loading...")])
            } else if state.tasks.is_empty() {
                div([class("text-center py-12")], [
                    p([class("text-ctp-subtext0")], [text("Nothing planned for this day.")]),
                ])
            } else {
                div([class("space-y-3")], [
                    p([class("text-sm text-ctp-subtext0")], [
                        text(format!("{} of {} done", done, state.tasks.len())),
                    ]),
                    ul(
                        [class("space-y-3")],
                        state.tasks.iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
                    ),
                ])
            },
        ])
    }

    fn view_task(&self, task: &UiTask) -> Node<Msg> {
        let task_id = task.id;
        li([
            key(task.id.to_string()),
            class(&format!(
                "flex items-center gap-4 border rounded-xl p-4 transition-all duration-300 {}",
                if task.completed {
                    "border-ctp-green bg-ctp-green/10"
                } else {
                    "border-ctp-surface1 hover:border-ctp-blue"
                }
            )),
        ], [
            input([
                r#type("checkbox"),
                checked(task.completed),
                id(&format!("checkbox-{}", task.id)),
                on_click(move |_| Msg::ToggleTask(task_id)),
            ], []),
            span([class(&format!(
                "flex-1 {}",
                if task.completed { "line-through text-ctp-overlay1" } else { "text-ctp-text" }
            ))], [text(&task.title)]),
            button([
                on_click(move |_| Msg::RemoveTask(task_id)),
                r#type("button"),
                class("inline-flex items-center justify-center w-8 h-8 rounded-lg bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30"),
            ], [text("🗑️")]),
        ])
    }
}
