//! The single request path every API call goes through.
//!
//! [`Gateway`] builds the URL, encodes the JSON body and normalizes failures
//! into [`ClientError`]. Moving bytes is delegated to a [`Transport`], which is
//! `fetch` in the browser and a scripted fake in tests.

use std::rc::Rc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, FALLBACK_MESSAGE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What the transport got back: status line and raw body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait Transport {
    /// Performs the round trip. Only failures to get any response at all are
    /// errors here; HTTP error statuses come back as an `Ok` response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

#[async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        (**self).send(request).await
    }
}

/// Per-call options for [`Gateway::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

pub struct Gateway<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> Gateway<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Builds the absolute URL for `path`, appending `params` as a query string.
    pub fn url_for(&self, path: &str, params: &[(String, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if !params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            url.push(if path.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        url
    }

    pub async fn request<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let RequestOptions {
            method,
            body,
            headers: custom_headers,
            params,
        } = options;

        let mut headers = Vec::new();
        let body = match body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(&value)?)
            }
            None => None,
        };
        for (name, value) in custom_headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        let request = HttpRequest {
            method,
            url: self.url_for(path, &params),
            headers,
            body,
        };
        tracing::debug!(method = method.as_str(), url = %request.url, "sending request");

        let response = self.transport.send(request).await?;
        let data: Value = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::Object(Default::default()));

        if !response.is_success() {
            let message = error_message(&data, &response.status_text);
            tracing::debug!(status = response.status, %message, "request failed");
            return Err(ClientError::Request {
                status: response.status,
                message,
            });
        }

        Ok(serde_json::from_value(data)?)
    }
}

fn error_message(data: &Value, status_text: &str) -> String {
    data.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .or(Some(status_text).filter(|text| !text.is_empty()))
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string()
}
