//! Service configuration

use std::net::SocketAddr;

use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

use crate::model::plans::Plan;

/// Logging output format
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Backend API the gateway proxies to
#[derive(Debug, Clone, Deserialize)]
pub struct Upstream {
    /// Base URL of the backend API
    pub base_url: String,
}

/// Session and credential configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    /// Secret the session envelope key is derived from
    pub session_secret: String,

    /// Service-to-service bearer credential for machine calls
    pub service_secret: String,

    /// Session lifetime in minutes
    #[serde(default = "Auth::default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,

    /// Identity provider endpoint confirming inner tokens. When absent the
    /// inner token is trusted after the envelope checks.
    #[serde(default)]
    pub identity_verify_url: Option<String>,
}

impl Auth {
    fn default_session_ttl_minutes() -> i64 {
        60
    }
}

/// Checkout bridging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Checkout {
    /// How long a pre-auth checkout intent stays resumable, in minutes
    #[serde(default = "Checkout::default_intent_ttl_minutes")]
    pub intent_ttl_minutes: i64,

    /// Pricing plans a checkout intent may reference
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl Default for Checkout {
    fn default() -> Self {
        Self {
            intent_ttl_minutes: Self::default_intent_ttl_minutes(),
            plans: Vec::new(),
        }
    }
}

impl Checkout {
    fn default_intent_ttl_minutes() -> i64 {
        10
    }
}

/// Public page allow-list for the unauthenticated listing routes
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PublicPages {
    /// Hosts accepted in the `Origin`/`Referer` of public listing requests
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Top level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address where to host the service
    #[serde(default = "Config::default_host")]
    pub host: SocketAddr,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,

    /// Backend API configuration
    pub upstream: Upstream,

    /// Session and credential configuration
    pub auth: Auth,

    /// Checkout bridging configuration
    #[serde(default)]
    pub checkout: Checkout,

    /// Public page allow-list
    #[serde(default)]
    pub public_pages: PublicPages,
}

impl Config {
    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 3030).into()
    }
}
