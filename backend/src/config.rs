use serde::Deserialize;

/// Origins allowed by CORS when `CORS_ORIGINS` is not set: the usual local
/// dev servers for the web client.
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000,http://127.0.0.1:5173";

pub const DEV_JWT_SECRET: &str = "taskflow-dev-secret";

/// Server settings, read from environment variables (`PORT`, `REDIS_URL`, ...).
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Comma-separated list of allowed origins.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Directory with the built web client, served for unmatched paths.
    #[serde(default)]
    pub static_dir: Option<String>,
    /// `redis` (default) or `memory`.
    #[serde(default = "default_store")]
    pub store: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn uses_memory_store(&self) -> bool {
        self.store.eq_ignore_ascii_case("memory")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            redis_url: default_redis_url(),
            jwt_secret: default_jwt_secret(),
            cors_origins: default_cors_origins(),
            static_dir: None,
            store: default_store(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_cors_origins() -> String {
    DEFAULT_CORS_ORIGINS.to_string()
}

fn default_store() -> String {
    "redis".to_string()
}
