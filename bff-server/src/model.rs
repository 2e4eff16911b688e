//! Service global context

use std::sync::Arc;

use chrono::Duration;
use color_eyre::Result;
use thiserror::Error;

pub mod auth;
pub mod cache;
pub mod checkout;
pub mod plans;

use auth::SessionKeeper;
use checkout::CheckoutStore;
use plans::PlanCatalog;

use crate::config::Config;
use crate::upstream::Upstream;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid upstream base URL: {url}")]
    InvalidUpstreamUrl { url: String },
    #[error("Invalid identity verify URL: {url}")]
    InvalidVerifyUrl { url: String },
}

struct ModelInner {
    /// Session envelope issuance and verification
    sessions: SessionKeeper,
    /// Backend API client
    upstream: Upstream,
    /// Parked pre-auth checkout intents
    checkout: CheckoutStore,
    /// Plans a checkout intent may reference
    plans: PlanCatalog,
    /// Hosts accepted for public listing requests
    public_origins: Vec<String>,
}

/// Shared state behind every handler
#[derive(Clone)]
pub struct Model(Arc<ModelInner>);

impl Model {
    /// Context from configuration.
    ///
    /// A single HTTP client is shared between the proxy and the identity
    /// provider confirmation calls.
    pub fn with_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::new();

        let base = config
            .upstream
            .base_url
            .parse()
            .map_err(|_| Error::InvalidUpstreamUrl {
                url: config.upstream.base_url.clone(),
            })?;

        let verify_url = config
            .auth
            .identity_verify_url
            .as_deref()
            .map(|url| {
                url.parse().map_err(|_| Error::InvalidVerifyUrl {
                    url: url.to_owned(),
                })
            })
            .transpose()?;

        Ok(Self(Arc::new(ModelInner {
            sessions: SessionKeeper::new(
                config.auth.session_secret.clone(),
                Duration::minutes(config.auth.session_ttl_minutes),
                verify_url,
                http.clone(),
            ),
            upstream: Upstream::new(base, config.auth.service_secret.clone(), http),
            checkout: CheckoutStore::new(Duration::minutes(config.checkout.intent_ttl_minutes)),
            plans: PlanCatalog::from_plans(config.checkout.plans.clone()),
            public_origins: config.public_pages.allowed_origins.clone(),
        })))
    }

    /// Access to session issuance and verification
    pub fn sessions(&self) -> &SessionKeeper {
        &self.0.sessions
    }

    /// Access to the backend API client
    pub fn upstream(&self) -> &Upstream {
        &self.0.upstream
    }

    /// Access to the checkout intent store
    pub fn checkout(&self) -> &CheckoutStore {
        &self.0.checkout
    }

    /// Access to the pricing plan catalogue
    pub fn plans(&self) -> &PlanCatalog {
        &self.0.plans
    }

    /// Hosts accepted for public listing requests
    pub fn public_origins(&self) -> &[String] {
        &self.0.public_origins
    }
}

#[cfg(test)]
impl Model {
    /// Secret the test context signs session envelopes with
    pub(crate) const TEST_SESSION_SECRET: &'static str = "test-session-secret";

    /// Context for testing purposes, pointed at the given backend stub
    pub(crate) fn test(upstream_base: &str) -> Self {
        use crate::config::{Auth, Checkout, Logging, PublicPages, Upstream as UpstreamConfig};
        use crate::model::plans::Plan;

        let config = Config {
            host: ([127, 0, 0, 1], 3030).into(),
            logging: Logging::default(),
            upstream: UpstreamConfig {
                base_url: upstream_base.to_owned(),
            },
            auth: Auth {
                session_secret: Self::TEST_SESSION_SECRET.to_owned(),
                service_secret: "test-service-secret".to_owned(),
                session_ttl_minutes: 60,
                identity_verify_url: None,
            },
            checkout: Checkout {
                intent_ttl_minutes: 10,
                plans: vec![
                    Plan {
                        id: "price_basic_monthly".to_owned(),
                        trial_days: None,
                    },
                    Plan {
                        id: "price_pro_yearly".to_owned(),
                        trial_days: Some(14),
                    },
                ],
            },
            public_pages: PublicPages {
                allowed_origins: vec!["app.example.com".to_owned()],
            },
        };

        Self::with_config(&config).unwrap()
    }
}
