//! Wallet endpoint (read-only balance plus the try deduction) and the
//! payment checkout redirect.

use serde_json::json;

use super::{http, ApiClient, ApiError};
use crate::models::{BalanceInfo, PaymentResponse, Transaction};

impl ApiClient {
    pub async fn fetch_balance(&self) -> Result<BalanceInfo, ApiError> {
        http::get_json(&self.endpoints().wallet, &[], &self.user_headers(), None).await
    }

    /// Debit one try. The server decides whether a free or paid try is
    /// consumed and returns the updated wallet state.
    pub async fn deduct_try(&self) -> Result<BalanceInfo, ApiError> {
        http::post_json(
            &self.endpoints().wallet,
            &json!({ "action": "deduct" }),
            &self.user_headers(),
            None,
        )
        .await
    }

    pub async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        http::get_json(
            &self.endpoints().wallet,
            &[("action", "transactions".to_string())],
            &self.user_headers(),
            None,
        )
        .await
    }

    /// Start a checkout; the caller redirects to the returned URL.
    pub async fn create_payment(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<PaymentResponse, ApiError> {
        http::post_json(
            &self.endpoints().payments,
            &json!({ "user_id": user_id, "amount": amount }),
            &self.user_headers(),
            None,
        )
        .await
    }
}
