//! Session envelope issuance and verification

use chrono::{DateTime, Duration, Utc};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use pasetors::{Local, local};
use sha3::{Digest, Sha3_256};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::cache::TtlCache;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,
    #[error("Malformed Authorization header")]
    MalformedAuthorization,
    #[error("Invalid authorization scheme")]
    InvalidScheme,
    #[error("Invalid session token")]
    InvalidToken,
    #[error("Session token expired")]
    Expired,
    #[error("Identity token rejected by the provider")]
    Rejected,
    #[error("Identity provider unreachable")]
    ProviderUnreachable,
}

/// PASETO implicit assertion binding envelopes to this service
const SESSION_IMPLICIT: &[u8] = b"CertPracticeGatewaySessionEnvelope";

/// Claim carrying the wrapped identity token
const TOKEN_CLAIM: &str = "token";

/// Claim carrying the envelope deadline
const EXPIRES_AT_CLAIM: &str = "expires_at";

/// How long a positive identity-provider confirmation is kept
const CONFIRMATION_TTL_MINUTES: i64 = 5;

/// The identity provider's own credential.
///
/// Always travels wrapped inside a [`SessionToken`] between the browser and
/// this service, and is the only user credential ever sent upstream. Never
/// stored server-side; re-extracted from the envelope on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Newtype for the signed session envelope string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

/// Freshly issued session envelope
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A verified session attached to the request
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The unwrapped identity token
    pub identity_token: IdentityToken,
    /// When the envelope was issued
    pub issued_at: DateTime<Utc>,
    /// When the envelope stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session envelopes.
///
/// The envelope is a PASETO v4 local token keyed off the configured signing
/// secret, carrying the identity token plus its validity window. Everything
/// a verification needs is inside the envelope; the keeper itself stores
/// nothing but a cache of identity-provider confirmations.
pub struct SessionKeeper {
    secret: String,
    ttl: Duration,
    verify_url: Option<reqwest::Url>,
    http: reqwest::Client,
    confirmations: TtlCache<String, ()>,
}

impl SessionKeeper {
    pub fn new(
        secret: impl Into<String>,
        ttl: Duration,
        verify_url: Option<reqwest::Url>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            secret: secret.into(),
            ttl,
            verify_url,
            http,
            confirmations: TtlCache::new(Duration::minutes(CONFIRMATION_TTL_MINUTES)),
        }
    }

    /// Wraps an identity token into a fresh session envelope.
    ///
    /// No validation of the inner token happens here; trust is deferred to
    /// verification time.
    pub fn issue(&self, identity_token: &IdentityToken) -> Result<IssuedSession, ApiError> {
        if self.secret.is_empty() {
            return Err(ApiError::Configuration(
                "Session signing secret is not configured".to_owned(),
            ));
        }

        let issued_at = Utc::now();
        let expires_at = issued_at + self.ttl;

        // Expiry lives in a claim of our own so the verifier can report an
        // expired envelope distinctly from a malformed one.
        let mut claims = Claims::new()?;
        claims.non_expiring();
        claims.token_identifier(&Uuid::new_v4().to_string())?;
        claims.add_additional(TOKEN_CLAIM, identity_token.as_str())?;
        claims.add_additional(EXPIRES_AT_CLAIM, expires_at.to_rfc3339())?;

        let token = local::encrypt(&self.envelope_key()?, &claims, None, Some(SESSION_IMPLICIT))?;

        Ok(IssuedSession {
            token: SessionToken(token),
            issued_at,
            expires_at,
        })
    }

    /// Unwraps a session envelope back into the identity token it carries.
    ///
    /// Structural or cryptographic failures report an invalid token, an
    /// envelope past its deadline reports expiry, and when an identity
    /// provider endpoint is configured the inner token is confirmed against
    /// it, with positive answers cached so the check stays cheap per request.
    pub async fn verify(&self, token: &SessionToken) -> Result<Session, AuthError> {
        let key = self.envelope_key().map_err(|_| AuthError::InvalidToken)?;
        let untrusted = UntrustedToken::<Local, V4>::try_from(token.as_str())
            .map_err(|_| AuthError::InvalidToken)?;

        let mut rules = ClaimsValidationRules::new();
        rules.allow_non_expiring();

        let trusted = local::decrypt(&key, &untrusted, &rules, None, Some(SESSION_IMPLICIT))
            .map_err(|_| AuthError::InvalidToken)?;
        let claims = trusted.payload_claims().ok_or(AuthError::InvalidToken)?;

        let identity_token = claims
            .get_claim(TOKEN_CLAIM)
            .and_then(|token| token.as_str())
            .ok_or(AuthError::InvalidToken)?;

        let expires_at: DateTime<Utc> = claims
            .get_claim(EXPIRES_AT_CLAIM)
            .and_then(|expires_at| expires_at.as_str())
            .ok_or(AuthError::InvalidToken)?
            .parse()
            .map_err(|_| AuthError::InvalidToken)?;

        if expires_at <= Utc::now() {
            return Err(AuthError::Expired);
        }

        let issued_at: DateTime<Utc> = claims
            .get_claim("iat")
            .and_then(|issued_at| issued_at.as_str())
            .ok_or(AuthError::InvalidToken)?
            .parse()
            .map_err(|_| AuthError::InvalidToken)?;

        let identity_token = IdentityToken::new(identity_token);
        self.confirm_with_provider(&identity_token).await?;

        Ok(Session {
            identity_token,
            issued_at,
            expires_at,
        })
    }

    /// Confirms the inner token against the identity provider, if configured
    async fn confirm_with_provider(&self, token: &IdentityToken) -> Result<(), AuthError> {
        let Some(url) = &self.verify_url else {
            return Ok(());
        };

        // Keyed by a digest so raw identity tokens never sit in the cache
        let key = token_digest(token.as_str());
        if self.confirmations.get(&key).await.is_some() {
            return Ok(());
        }

        let response = self
            .http
            .post(url.clone())
            .json(&serde_json::json!({ "token": token.as_str() }))
            .send()
            .await
            .map_err(|_| AuthError::ProviderUnreachable)?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected);
        }

        self.confirmations.put(key, ()).await;
        Ok(())
    }

    fn envelope_key(&self) -> Result<SymmetricKey<V4>, pasetors::errors::Error> {
        // The configured secret is free-form; stretch it to key size
        let mut hasher = Sha3_256::new();
        hasher.update(self.secret.as_bytes());
        let key: [u8; 32] = hasher.finalize().into();
        SymmetricKey::<V4>::from(&key)
    }
}

fn token_digest(token: &str) -> String {
    use base64::prelude::*;

    let mut hasher = Sha3_256::new();
    hasher.update(token.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    BASE64_STANDARD.encode(digest)
}
