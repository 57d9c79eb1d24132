//! REST client for the externally-owned serverless endpoints.
//!
//! One [`ApiClient`] is shared by the whole app; the per-collaborator calls
//! live in the submodules. All business logic is on the other side of these
//! requests — this layer only shapes them and decodes the responses.

mod http;

pub mod admin;
pub mod catalog;
pub mod generation;
pub mod lookbook;
pub mod wallet;

use crate::config::Endpoints;
use crate::models::AdminSession;
use crate::storage;

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself failed (network, DNS, user abort).
    #[error("request failed: {0}")]
    Network(String),

    /// The server answered with a non-2xx status code.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the JSON we expected.
    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type Headers = Vec<(&'static str, String)>;

/// Fetch raw bytes from an arbitrary URL (CDN images and the like).
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ApiError> {
    http::get_bytes(url).await
}

#[derive(Clone)]
pub struct ApiClient {
    endpoints: Endpoints,
    session_token: Option<String>,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            session_token: storage::load_session_token(),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Headers attached to every user-scoped request. The session token is
    /// issued by the external auth layer; without one the server treats the
    /// caller as anonymous.
    fn user_headers(&self) -> Headers {
        match &self.session_token {
            Some(token) => vec![("x-session-token", token.clone())],
            None => Vec::new(),
        }
    }

    fn admin_headers(session: &AdminSession) -> Headers {
        vec![("authorization", format!("Bearer {}", session.token))]
    }
}
