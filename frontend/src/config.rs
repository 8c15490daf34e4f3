/// Base URL used when `TASKFLOW_API_BASE` is not set at build time.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// The API base URL baked into this build.
pub fn api_base() -> &'static str {
    option_env!("TASKFLOW_API_BASE").unwrap_or(DEFAULT_API_BASE)
}
