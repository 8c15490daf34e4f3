use std::rc::Rc;

use taskflow_shared::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ClientError;
use crate::gateway::{Gateway, Method, RequestOptions, Transport};

pub struct AuthApi<T> {
    gateway: Rc<Gateway<T>>,
}

impl<T> Clone for AuthApi<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: Rc::clone(&self.gateway),
        }
    }
}

impl<T: Transport> AuthApi<T> {
    pub fn new(gateway: Rc<Gateway<T>>) -> Self {
        Self { gateway }
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        self.gateway
            .request("/register", RequestOptions::new(Method::Post).json(&body)?)
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.gateway
            .request("/login", RequestOptions::new(Method::Post).json(&body)?)
            .await
    }
}
