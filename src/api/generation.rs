//! Generation endpoint: job submission, status polling, history append.

use serde::Serialize;

use super::{http, ApiClient, ApiError};
use crate::models::{GenerationRecord, ReplicateCategory, StatusResponse, SubmitResponse};
use crate::platform::AbortHandle;

/// Parameters of one try-on job. Images travel as URLs or data URLs.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub person_image: String,
    pub garment_image: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<ReplicateCategory>,
}

impl ApiClient {
    /// Queue a job; the returned `status_url` identifies it from then on.
    pub async fn submit_generation(
        &self,
        request: &GenerateRequest,
        abort: Option<&AbortHandle>,
    ) -> Result<SubmitResponse, ApiError> {
        http::post_json(
            &self.endpoints().generation,
            request,
            &self.user_headers(),
            abort,
        )
        .await
    }

    pub async fn generation_status(
        &self,
        status_url: &str,
        abort: Option<&AbortHandle>,
    ) -> Result<StatusResponse, ApiError> {
        http::get_json(
            &self.endpoints().generation,
            &[("status_url", status_url.to_string())],
            &self.user_headers(),
            abort,
        )
        .await
    }

    /// Append a finished generation to the history log. Callers treat this
    /// as fire-and-forget; a failure must not disturb the displayed result.
    pub async fn append_history(&self, record: &GenerationRecord) -> Result<(), ApiError> {
        http::post_json::<_, serde_json::Value>(
            &self.endpoints().history,
            record,
            &self.user_headers(),
            None,
        )
        .await
        .map(|_| ())
    }
}
