//! Admin endpoints, all behind a bearer token obtained from the password
//! login. The token and its expiry are persisted by the caller.

use serde_json::json;

use super::{http, ApiClient, ApiError};
use crate::models::{AdminSession, AdminStats, GenerationRecord, Lookbook, UserAccount};

impl ApiClient {
    /// Exchange the admin password for a bearer session.
    pub async fn admin_login(&self, password: &str) -> Result<AdminSession, ApiError> {
        http::post_json(
            &format!("{}/login", self.endpoints().admin),
            &json!({ "password": password }),
            &Vec::new(),
            None,
        )
        .await
    }

    pub async fn admin_stats(&self, session: &AdminSession) -> Result<AdminStats, ApiError> {
        http::get_json(
            &format!("{}/stats", self.endpoints().admin),
            &[],
            &Self::admin_headers(session),
            None,
        )
        .await
    }

    pub async fn admin_users(&self, session: &AdminSession) -> Result<Vec<UserAccount>, ApiError> {
        http::get_json(
            &format!("{}/users", self.endpoints().admin),
            &[],
            &Self::admin_headers(session),
            None,
        )
        .await
    }

    pub async fn admin_set_unlimited(
        &self,
        session: &AdminSession,
        user_id: &str,
        unlimited: bool,
    ) -> Result<UserAccount, ApiError> {
        http::post_json(
            &format!("{}/users/unlimited", self.endpoints().admin),
            &json!({ "user_id": user_id, "unlimited_access": unlimited }),
            &Self::admin_headers(session),
            None,
        )
        .await
    }

    pub async fn admin_lookbooks(&self, session: &AdminSession) -> Result<Vec<Lookbook>, ApiError> {
        http::get_json(
            &format!("{}/lookbooks", self.endpoints().admin),
            &[],
            &Self::admin_headers(session),
            None,
        )
        .await
    }

    pub async fn admin_generations(
        &self,
        session: &AdminSession,
    ) -> Result<Vec<GenerationRecord>, ApiError> {
        http::get_json(
            &format!("{}/generations", self.endpoints().admin),
            &[],
            &Self::admin_headers(session),
            None,
        )
        .await
    }
}
