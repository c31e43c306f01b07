use std::time::Duration;

use log::*;
use sfm_common::{
    helpers::{parse_boolean_flag, parse_list},
    Secret,
};

pub const DEFAULT_ENABLED_PAYMENTS: [&str; 4] = ["gopay", "shopeepay", "bank_transfer", "credit_card"];
const DEFAULT_TIMEOUT_SECS: u64 = 15;

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    /// Used for Snap basic auth and for verifying notification signatures
    pub server_key: Secret<String>,
    pub client_key: String,
    pub is_production: bool,
    /// Overrides the Snap base URL. Mostly useful for pointing the client at a local mock.
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub enabled_payments: Vec<String>,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            server_key: Secret::default(),
            client_key: String::default(),
            is_production: false,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            enabled_payments: DEFAULT_ENABLED_PAYMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MidtransConfig {
    pub fn new_from_env_or_default() -> Self {
        let server_key = Secret::new(std::env::var("SFM_MIDTRANS_SERVER_KEY").unwrap_or_else(|_| {
            error!(
                "SFM_MIDTRANS_SERVER_KEY is not set. Payment intents cannot be created and every gateway notification \
                 will fail signature verification."
            );
            String::default()
        }));
        let client_key = std::env::var("SFM_MIDTRANS_CLIENT_KEY").unwrap_or_else(|_| {
            warn!("SFM_MIDTRANS_CLIENT_KEY is not set. Clients will need to be configured with the key separately.");
            String::default()
        });
        let is_production = parse_boolean_flag(std::env::var("SFM_MIDTRANS_PRODUCTION").ok(), false);
        let base_url = std::env::var("SFM_MIDTRANS_BASE_URL").ok();
        let timeout = std::env::var("SFM_MIDTRANS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid SFM_MIDTRANS_TIMEOUT_SECS ({s}): {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let enabled_payments = match std::env::var("SFM_ENABLED_PAYMENTS").ok().map(|s| parse_list(&s)) {
            Some(list) if !list.is_empty() => list,
            _ => {
                info!("🪛️ SFM_ENABLED_PAYMENTS is not set. Using {}", DEFAULT_ENABLED_PAYMENTS.join(","));
                DEFAULT_ENABLED_PAYMENTS.iter().map(|s| s.to_string()).collect()
            },
        };
        Self {
            server_key,
            client_key,
            is_production,
            base_url,
            timeout: Duration::from_secs(timeout),
            enabled_payments,
        }
    }

    pub fn snap_base_url(&self) -> &str {
        match (&self.base_url, self.is_production) {
            (Some(url), _) => url.as_str(),
            (None, true) => PRODUCTION_SNAP_URL,
            (None, false) => SANDBOX_SNAP_URL,
        }
    }
}
