//! Who is logged in, mirrored to durable storage.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::AuthApi;
use crate::error::ClientError;
use crate::gateway::Transport;
use crate::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "taskflow_token";
pub const USERNAME_KEY: &str = "taskflow_username";

/// Source of the bearer token for token-protected calls.
pub trait TokenProvider {
    fn token(&self) -> Option<String>;

    fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

impl<P: TokenProvider + ?Sized> TokenProvider for Rc<P> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub username: String,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

pub struct SessionStore<T, S> {
    api: AuthApi<T>,
    storage: S,
    session: RefCell<Session>,
}

impl<T: Transport, S: KeyValueStore> SessionStore<T, S> {
    /// Rebuilds the session from whatever `storage` holds. This is the only
    /// time storage is read.
    pub fn restore(api: AuthApi<T>, storage: S) -> Self {
        let session = Session {
            token: storage.get(TOKEN_KEY).filter(|token| !token.is_empty()),
            username: storage.get(USERNAME_KEY).unwrap_or_default(),
        };
        tracing::debug!(logged_in = session.is_logged_in(), "restored session");
        Self {
            api,
            storage,
            session: RefCell::new(session),
        }
    }

    pub fn username(&self) -> String {
        self.session.borrow().username.clone()
    }

    pub fn auth_api(&self) -> &AuthApi<T> {
        &self.api
    }

    /// Exchanges credentials for a token. On failure the session and storage
    /// are left exactly as they were.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self.api.login(username, password).await?;
        self.set_auth(&response.token, &response.user.username);
        tracing::info!(username = %response.user.username, "logged in");
        Ok(())
    }

    pub fn set_auth(&self, token: &str, username: &str) {
        {
            let mut session = self.session.borrow_mut();
            session.token = Some(token.to_string());
            session.username = username.to_string();
        }
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(USERNAME_KEY, username);
    }

    /// Forgets the token locally. The server is not told.
    pub fn logout(&self) {
        *self.session.borrow_mut() = Session::default();
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USERNAME_KEY);
    }
}

impl<T, S> TokenProvider for SessionStore<T, S> {
    fn token(&self) -> Option<String> {
        self.session.borrow().token.clone()
    }
}
