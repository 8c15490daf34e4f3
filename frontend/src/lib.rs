//! Browser client for the TaskFlow API.
//!
//! Everything above the [`gateway::Transport`] and [`storage::KeyValueStore`]
//! seams is plain Rust and runs anywhere; the `fetch` transport, the
//! `localStorage` backend and the sauron UI are only built for `wasm32`.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod router;
pub mod session;
pub mod storage;
pub mod tasks;

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod fetch;
#[cfg(target_arch = "wasm32")]
mod logging;

pub use error::ClientError;
pub use gateway::{Gateway, HttpRequest, HttpResponse, Method, RequestOptions, Transport};
pub use router::{guard, Route};
pub use session::{Session, SessionStore, TokenProvider};
pub use storage::{KeyValueStore, MemoryStorage};
pub use tasks::{TaskListState, TaskStore, UiTask};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!(api = config::api_base(), "starting taskflow");
    sauron::prelude::Program::mount_to_body(app::App::new());
}
