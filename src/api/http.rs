//! Transport primitives. The wasm build speaks `fetch` through `gloo-net`;
//! the native build has stubs so the crate compiles and unit-tests off-web.

#[cfg(target_arch = "wasm32")]
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiError, Headers};
use crate::platform::AbortHandle;

pub(crate) type Query<'a> = &'a [(&'static str, String)];

#[cfg(target_arch = "wasm32")]
fn net_err(e: gloo_net::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

#[cfg(target_arch = "wasm32")]
fn prepare(mut builder: RequestBuilder, query: Query<'_>, headers: &Headers, abort: Option<&AbortHandle>) -> RequestBuilder {
    if !query.is_empty() {
        builder = builder.query(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    if let Some(handle) = abort {
        if let Some(signal) = handle.signal() {
            builder = builder.abort_signal(Some(&signal));
        }
    }
    builder
}

#[cfg(target_arch = "wasm32")]
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(ApiError::Status { status, body })
}

#[cfg(target_arch = "wasm32")]
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn get_json<T: DeserializeOwned>(
    url: &str,
    query: Query<'_>,
    headers: &Headers,
    abort: Option<&AbortHandle>,
) -> Result<T, ApiError> {
    let response = prepare(Request::get(url), query, headers, abort)
        .send()
        .await
        .map_err(net_err)?;
    decode_json(response).await
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
    url: &str,
    body: &B,
    headers: &Headers,
    abort: Option<&AbortHandle>,
) -> Result<T, ApiError> {
    let response = prepare(Request::post(url), &[], headers, abort)
        .json(body)
        .map_err(net_err)?
        .send()
        .await
        .map_err(net_err)?;
    decode_json(response).await
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
    url: &str,
    body: &B,
    headers: &Headers,
) -> Result<T, ApiError> {
    let response = prepare(Request::put(url), &[], headers, None)
        .json(body)
        .map_err(net_err)?
        .send()
        .await
        .map_err(net_err)?;
    decode_json(response).await
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn delete(
    url: &str,
    query: Query<'_>,
    headers: &Headers,
) -> Result<(), ApiError> {
    let response = prepare(Request::delete(url), query, headers, None)
        .send()
        .await
        .map_err(net_err)?;
    ensure_success(response).await.map(|_| ())
}

/// Raw bytes, used for remote image loading.
#[cfg(target_arch = "wasm32")]
pub(crate) async fn get_bytes(url: &str) -> Result<Vec<u8>, ApiError> {
    let response = Request::get(url).send().await.map_err(net_err)?;
    let response = ensure_success(response).await?;
    response
        .binary()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

// --------------------------- non-wasm stubs ---------------------------

#[cfg(not(target_arch = "wasm32"))]
fn offline<T>() -> Result<T, ApiError> {
    Err(ApiError::Network(
        "HTTP is only available in the browser build".to_string(),
    ))
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn get_json<T: DeserializeOwned>(
    _url: &str,
    _query: Query<'_>,
    _headers: &Headers,
    _abort: Option<&AbortHandle>,
) -> Result<T, ApiError> {
    offline()
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
    _url: &str,
    _body: &B,
    _headers: &Headers,
    _abort: Option<&AbortHandle>,
) -> Result<T, ApiError> {
    offline()
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
    _url: &str,
    _body: &B,
    _headers: &Headers,
) -> Result<T, ApiError> {
    offline()
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn delete(
    _url: &str,
    _query: Query<'_>,
    _headers: &Headers,
) -> Result<(), ApiError> {
    offline()
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn get_bytes(_url: &str) -> Result<Vec<u8>, ApiError> {
    offline()
}
