//! Pre-authentication checkout intents

use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::model::cache::TtlCache;

/// Key prefix mixed into fingerprint digests
const FINGERPRINT_APP_KEY: &str = "CertPracticeGatewayFingerprint";

/// Derived key correlating an unauthenticated visitor across requests.
///
/// Not an identity: two visitors behind the same client stack can collide,
/// which at worst resumes the wrong plan selection. Good enough to bridge
/// "user picks a plan" and "user signs in".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derives the key from request characteristics
    pub fn derive(user_agent: &str, accept_language: &str, peer: &str) -> Self {
        let data = format!("{FINGERPRINT_APP_KEY}.{user_agent}.{accept_language}.{peer}");

        let mut hasher = Sha3_256::new();
        hasher.update(data.as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();

        Self(BASE64_STANDARD.encode(digest))
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A visitor's plan selection, parked until they sign in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutIntent {
    /// Selected pricing plan id
    pub price_id: String,
    /// Where the payment page returns on success
    pub success_url: String,
    /// Where the payment page returns on abort
    pub cancel_url: String,
    /// Trial length forwarded to the backend, if any
    pub trial_days: Option<u32>,
    /// When the visitor selected the plan
    pub created_at: DateTime<Utc>,
}

/// Fingerprint-keyed store of checkout intents.
///
/// An intent is stored before sign-in, then consumed exactly once after
/// sign-in; whatever is not consumed expires away.
pub struct CheckoutStore {
    intents: TtlCache<Fingerprint, CheckoutIntent>,
}

impl CheckoutStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            intents: TtlCache::new(ttl),
        }
    }

    /// Parks an intent for the visitor, returning when it expires
    pub async fn store(&self, fingerprint: Fingerprint, intent: CheckoutIntent) -> DateTime<Utc> {
        self.intents.put(fingerprint, intent).await
    }

    /// Takes the visitor's intent out of the store.
    ///
    /// At most one caller gets the intent; repeated consumption and expired
    /// entries both come back empty.
    pub async fn consume(&self, fingerprint: &Fingerprint) -> Option<CheckoutIntent> {
        self.intents.remove(fingerprint).await
    }

    /// Drops the visitor's intent, if any
    pub async fn clear(&self, fingerprint: &Fingerprint) {
        let _ = self.intents.remove(fingerprint).await;
    }
}
