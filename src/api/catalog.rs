//! Catalog endpoint: filter taxonomy, item listing, admin item CRUD.

use super::{http, ApiClient, ApiError};
use crate::models::{AdminSession, ClothingItem, FilterSelection, FilterTaxonomy};

impl ApiClient {
    pub async fn fetch_filters(&self) -> Result<FilterTaxonomy, ApiError> {
        http::get_json(
            &self.endpoints().catalog,
            &[("action", "filters".to_string())],
            &self.user_headers(),
            None,
        )
        .await
    }

    /// Item list, filtered server-side by the selected taxonomy values.
    pub async fn fetch_items(
        &self,
        filters: &FilterSelection,
    ) -> Result<Vec<ClothingItem>, ApiError> {
        let mut query = vec![("action", "list".to_string())];
        query.extend(filters.to_query());
        http::get_json(&self.endpoints().catalog, &query, &self.user_headers(), None).await
    }

    pub async fn create_item(
        &self,
        session: &AdminSession,
        item: &ClothingItem,
    ) -> Result<ClothingItem, ApiError> {
        http::post_json(
            &self.endpoints().catalog,
            item,
            &Self::admin_headers(session),
            None,
        )
        .await
    }

    /// Full replacement of an existing item.
    pub async fn update_item(
        &self,
        session: &AdminSession,
        item: &ClothingItem,
    ) -> Result<ClothingItem, ApiError> {
        http::put_json(
            &self.endpoints().catalog,
            item,
            &Self::admin_headers(session),
        )
        .await
    }

    pub async fn delete_item(&self, session: &AdminSession, id: &str) -> Result<(), ApiError> {
        http::delete(
            &self.endpoints().catalog,
            &[("id", id.to_string())],
            &Self::admin_headers(session),
        )
        .await
    }
}
