use serde::{Deserialize, Serialize};

/// Base URLs of the external serverless endpoints. Everything the app does
/// goes through one of these; none of them are owned by this codebase.
///
/// Defaults are same-origin relative paths so a deployment behind a single
/// domain needs no configuration. A JSON override can be placed in
/// localStorage under `styleselect.endpoints` (useful for staging).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_wallet")]
    pub wallet: String,
    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default = "default_generation")]
    pub generation: String,
    #[serde(default = "default_lookbooks")]
    pub lookbooks: String,
    #[serde(default = "default_history")]
    pub history: String,
    #[serde(default = "default_payments")]
    pub payments: String,
    #[serde(default = "default_admin")]
    pub admin: String,
}

fn default_wallet() -> String {
    "/api/balance".to_string()
}

fn default_catalog() -> String {
    "/api/wardrobe".to_string()
}

fn default_generation() -> String {
    "/api/generate".to_string()
}

fn default_lookbooks() -> String {
    "/api/lookbooks".to_string()
}

fn default_history() -> String {
    "/api/history".to_string()
}

fn default_payments() -> String {
    "/api/payments".to_string()
}

fn default_admin() -> String {
    "/api/admin".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            wallet: default_wallet(),
            catalog: default_catalog(),
            generation: default_generation(),
            lookbooks: default_lookbooks(),
            history: default_history(),
            payments: default_payments(),
            admin: default_admin(),
        }
    }
}

impl Endpoints {
    /// Load the endpoint table, honoring a localStorage override if one is
    /// present and parseable. A broken override falls back to defaults.
    pub fn load() -> Self {
        match crate::storage::get_raw(crate::storage::KEY_ENDPOINTS) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring malformed endpoint override: {e}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let cfg: Endpoints = serde_json::from_str(r#"{"catalog":"https://x.test/w"}"#).unwrap();
        assert_eq!(cfg.catalog, "https://x.test/w");
        assert_eq!(cfg.wallet, "/api/balance");
        assert_eq!(cfg.admin, "/api/admin");
    }
}
