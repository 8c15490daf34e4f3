//! Typed wrappers over the gateway, one per server resource.

mod auth;
mod tasks;

pub use auth::AuthApi;
pub use tasks::TaskApi;
