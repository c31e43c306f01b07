use std::{env, net::IpAddr};

use log::*;
use midtrans_tools::MidtransConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sfm_common::{helpers::parse_boolean_flag, Secret};

use crate::errors::ServerError;

const DEFAULT_SFM_HOST: &str = "127.0.0.1";
const DEFAULT_SFM_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/sfm_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth: AuthConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// If supplied, requests against /webhook endpoints will be checked against a whitelist of gateway IP addresses.
    /// To explicitly disable the whitelist, set this to "false", "none", or "0".
    pub webhook_whitelist: Option<Vec<IpAddr>>,
    pub midtrans: MidtransConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFM_HOST.to_string(),
            port: DEFAULT_SFM_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            webhook_whitelist: None,
            midtrans: MidtransConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFM_HOST").ok().unwrap_or_else(|| DEFAULT_SFM_HOST.into());
        let port = env::var("SFM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFM_PORT. {e} Using the default, {DEFAULT_SFM_PORT}, instead."
                    );
                    DEFAULT_SFM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFM_PORT);
        let database_url = env::var("SFM_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SFM_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env::var("SFM_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| {
                        error!("🪛️ {s} is not a valid value for SFM_DB_MAX_CONNECTIONS. {e}");
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Bearer tokens \
                 will be checked against a random secret that is only valid for this session."
            );
            AuthConfig::default()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("SFM_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SFM_USE_FORWARDED").ok(), false);
        let webhook_whitelist = env::var("SFM_WEBHOOK_IP_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        match &webhook_whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The webhook IP whitelist was configured, but is empty. The server will run, but won't accept \
                     any payment notifications."
                );
            },
            None => {
                info!("🪛️ No webhook IP whitelist is set. Only notification signatures will be checked.");
            },
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Webhook IP whitelist: {addrs}");
            },
        }
        let midtrans = MidtransConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_connections,
            auth,
            use_x_forwarded_for,
            use_forwarded,
            webhook_whitelist,
            midtrans,
        }
    }
}

/// Parses a comma-separated list of IP addresses. Invalid entries are skipped. "none", "false" and "0" switch the
/// whitelist off.
pub fn parse_whitelist(value: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0"].contains(&value.trim().to_lowercase().as_str()) {
        info!(
            "🪛️ Webhook IP whitelist is disabled. If this is not what you want, set SFM_WEBHOOK_IP_WHITELIST to a \
             comma-separated list of IP addresses to enable it."
        );
        return None;
    }
    let ip_addrs = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| {
                    warn!("🪛️ Ignoring invalid IP address ({s}) in SFM_WEBHOOK_IP_WHITELIST: {e}");
                })
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 secret that bearer tokens are signed with
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        warn!(
            "🪛️ Using a randomly generated JWT secret. Tokens issued elsewhere will not be accepted, and tokens \
             accepted now will be rejected after a restart. Set SFM_JWT_SECRET to fix this."
        );
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("SFM_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("SFM_JWT_SECRET is not available. {e}")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("SFM_JWT_SECRET is empty".to_string()));
        }
        Ok(Self::new(secret))
    }
}
