use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Garment classification expected by the upstream generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicateCategory {
    UpperBody,
    LowerBody,
    Dresses,
}

impl ReplicateCategory {
    pub const ALL: [ReplicateCategory; 3] = [
        ReplicateCategory::UpperBody,
        ReplicateCategory::LowerBody,
        ReplicateCategory::Dresses,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReplicateCategory::UpperBody => "Upper body",
            ReplicateCategory::LowerBody => "Lower body",
            ReplicateCategory::Dresses => "Dress",
        }
    }
}

/// One catalog entry. Tag arrays come straight from the server; the admin
/// edit form PUTs a full replacement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClothingItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub archetypes: Vec<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub replicate_category: Option<ReplicateCategory>,
}

impl ClothingItem {
    /// Client-side re-check of the server-side filtering. The server already
    /// filters by query parameters; this keeps the grid honest when cached
    /// results outlive a filter change.
    pub fn matches(&self, filters: &FilterSelection) -> bool {
        let any = |selected: &BTreeSet<String>, tags: &[String]| {
            selected.is_empty() || tags.iter().any(|t| selected.contains(t))
        };
        if !any(&filters.categories, &self.categories) {
            return false;
        }
        if !any(&filters.colors, &self.colors) {
            return false;
        }
        if !any(&filters.archetypes, &self.archetypes) {
            return false;
        }
        match (&filters.gender, &self.gender) {
            (Some(want), Some(have)) => want == have,
            // Ungendered items show up for everyone.
            _ => true,
        }
    }
}

/// Filter taxonomy served by the catalog endpoint (`?action=filters`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterTaxonomy {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub archetypes: Vec<String>,
    #[serde(default)]
    pub genders: Vec<String>,
}

/// Checkbox state of the catalog filter panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub categories: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub archetypes: BTreeSet<String>,
    pub gender: Option<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.colors.is_empty()
            && self.archetypes.is_empty()
            && self.gender.is_none()
    }

    /// Query parameters in the form the catalog endpoint expects
    /// (comma-separated values, absent when unselected).
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        let mut out = Vec::new();
        if !self.categories.is_empty() {
            out.push(("categories", join(&self.categories)));
        }
        if !self.colors.is_empty() {
            out.push(("colors", join(&self.colors)));
        }
        if !self.archetypes.is_empty() {
            out.push(("archetypes", join(&self.archetypes)));
        }
        if let Some(g) = &self.gender {
            out.push(("gender", g.clone()));
        }
        out
    }
}

/// A named photo collection with a color palette. Photos are URLs (or data
/// URLs for not-yet-uploaded results); the palette is a list of hex strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lookbook {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub person_name: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Server-computed wallet state; read-only on the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceInfo {
    #[serde(default)]
    pub user_id: Option<String>,
    pub balance: i64,
    pub free_tries_remaining: u32,
    pub paid_tries_available: u32,
    #[serde(default)]
    pub unlimited_access: bool,
    #[serde(default)]
    pub can_generate: bool,
}

/// One row of the append-only transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// In-flight try-on job, persisted to localStorage right after submission so
/// a reload can resume polling. Cleared on every terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingGeneration {
    pub person_image: String,
    pub garment_image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_hint: Option<ReplicateCategory>,
    pub status_url: String,
}

/// Record appended to the history endpoint after a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub garment_image: String,
    pub result_url: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Response of the generation submit endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub status_url: String,
}

/// Response of the generation status endpoint. Anything that is neither
/// `COMPLETED` nor `FAILED` means the job is still running.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "FAILED"
    }
}

/// Admin bearer session, persisted with its expiry timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_generations: u64,
    #[serde(default)]
    pub total_lookbooks: u64,
    #[serde(default)]
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub unlimited_access: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResponse {
    pub payment_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with(categories: &[&str], gender: Option<&str>) -> ClothingItem {
        ClothingItem {
            name: "test".into(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            gender: gender.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn empty_selection_matches_everything() {
        let item = item_with(&["jackets"], Some("female"));
        assert!(item.matches(&FilterSelection::default()));
    }

    #[test]
    fn category_filter_requires_overlap() {
        let item = item_with(&["jackets", "outerwear"], None);
        let mut filters = FilterSelection::default();
        filters.categories.insert("outerwear".into());
        assert!(item.matches(&filters));

        filters.categories.clear();
        filters.categories.insert("dresses".into());
        assert!(!item.matches(&filters));
    }

    #[test]
    fn ungendered_items_pass_gender_filter() {
        let mut filters = FilterSelection::default();
        filters.gender = Some("male".into());
        assert!(item_with(&[], None).matches(&filters));
        assert!(!item_with(&[], Some("female")).matches(&filters));
        assert!(item_with(&[], Some("male")).matches(&filters));
    }

    #[test]
    fn query_parameters_are_comma_joined() {
        let mut filters = FilterSelection::default();
        filters.categories.insert("b".into());
        filters.categories.insert("a".into());
        filters.gender = Some("female".into());
        let query = filters.to_query();
        assert_eq!(
            query,
            vec![
                ("categories", "a,b".to_string()),
                ("gender", "female".to_string()),
            ]
        );
    }

    #[test]
    fn pending_generation_round_trips_through_json() {
        let pending = PendingGeneration {
            person_image: "data:image/jpeg;base64,AAAA".into(),
            garment_image: "https://cdn.example/garment.png".into(),
            description: "red jacket".into(),
            category_hint: Some(ReplicateCategory::UpperBody),
            status_url: "https://jobs.example/123".into(),
        };
        let json = serde_json::to_string(&pending).unwrap();
        assert!(json.contains("\"upper_body\""));
        let back: PendingGeneration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pending);
    }

    #[test]
    fn unknown_status_is_not_terminal() {
        let status = StatusResponse {
            status: "IN_QUEUE".into(),
            ..Default::default()
        };
        assert!(!status.is_completed());
        assert!(!status.is_failed());
    }
}
