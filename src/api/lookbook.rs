//! Lookbook endpoint. Updates are full replacements of the photo array, so
//! moving a photo between books is two PUTs issued by the client.

use super::{http, ApiClient, ApiError};
use crate::models::Lookbook;

impl ApiClient {
    /// Lookbooks of the calling user (identified by the session header).
    pub async fn fetch_lookbooks(&self) -> Result<Vec<Lookbook>, ApiError> {
        http::get_json(&self.endpoints().lookbooks, &[], &self.user_headers(), None).await
    }

    pub async fn create_lookbook(&self, book: &Lookbook) -> Result<Lookbook, ApiError> {
        http::post_json(&self.endpoints().lookbooks, book, &self.user_headers(), None).await
    }

    pub async fn update_lookbook(&self, book: &Lookbook) -> Result<Lookbook, ApiError> {
        http::put_json(&self.endpoints().lookbooks, book, &self.user_headers()).await
    }
}
