//! [`Transport`] over the browser's `fetch`.

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::error::ClientError;
use crate::gateway::{HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn network(context: &str, err: JsValue) -> ClientError {
    ClientError::Network(format!("{context}: {err:?}"))
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let fetch_request = Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|err| network("failed to create request", err))?;
        for (name, value) in &request.headers {
            fetch_request
                .headers()
                .set(name, value)
                .map_err(|err| network("failed to set header", err))?;
        }

        let window = web_sys::window()
            .ok_or_else(|| ClientError::Network("no window available".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&fetch_request))
            .await
            .map_err(|err| network("failed to send request", err))?
            .into();

        let text_promise = response
            .text()
            .map_err(|err| network("failed to read response", err))?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(|err| network("failed to read response", err))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse {
            status: response.status(),
            status_text: response.status_text(),
            body,
        })
    }
}
