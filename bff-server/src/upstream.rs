//! Backend API request proxy

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use reqwest::{Method, Url};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::model::auth::IdentityToken;

/// Bearer credential attached to an outbound call.
///
/// Only an unwrapped identity token or the configured service secret can be
/// forwarded; the session envelope has no way in here.
#[derive(Debug, Clone, Copy)]
pub enum Credential<'a> {
    /// The verified user's identity token
    Identity(&'a IdentityToken),
    /// Service-to-service secret for machine calls
    Service,
}

/// A successful backend answer, relayed verbatim
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Turns the relayed answer into an HTTP response with the original status
    pub fn into_http(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        HttpResponse::build(status)
            .content_type(ContentType::json())
            .body(self.body)
    }
}

/// HTTP client for the authoritative backend API.
///
/// Forwards a caller's path and query verbatim, attaches the bearer
/// credential, and mirrors backend failures back as [`ApiError::Upstream`]
/// with the original status. No retries: the first failure is surfaced.
pub struct Upstream {
    base: Url,
    service_secret: String,
    client: reqwest::Client,
}

impl Upstream {
    pub fn new(mut base: Url, service_secret: impl Into<String>, client: reqwest::Client) -> Self {
        // Url::join drops the last path segment unless the base ends in '/'
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Self {
            base,
            service_secret: service_secret.into(),
            client,
        }
    }

    pub async fn get(
        &self,
        resource: &'static str,
        path: &str,
        query: &str,
        credential: Credential<'_>,
    ) -> Result<UpstreamResponse, ApiError> {
        self.request(resource, Method::GET, path, query, None, credential)
            .await
    }

    pub async fn post(
        &self,
        resource: &'static str,
        path: &str,
        body: &serde_json::Value,
        credential: Credential<'_>,
    ) -> Result<UpstreamResponse, ApiError> {
        self.request(resource, Method::POST, path, "", Some(body), credential)
            .await
    }

    pub async fn put(
        &self,
        resource: &'static str,
        path: &str,
        body: &serde_json::Value,
        credential: Credential<'_>,
    ) -> Result<UpstreamResponse, ApiError> {
        self.request(resource, Method::PUT, path, "", Some(body), credential)
            .await
    }

    pub async fn delete(
        &self,
        resource: &'static str,
        path: &str,
        credential: Credential<'_>,
    ) -> Result<UpstreamResponse, ApiError> {
        self.request(resource, Method::DELETE, path, "", None, credential)
            .await
    }

    async fn request(
        &self,
        resource: &'static str,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&serde_json::Value>,
        credential: Credential<'_>,
    ) -> Result<UpstreamResponse, ApiError> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }

        let bearer = match credential {
            Credential::Identity(token) => token.as_str(),
            Credential::Service => {
                if self.service_secret.is_empty() {
                    return Err(ApiError::Configuration(
                        "Service secret is not configured".to_owned(),
                    ));
                }
                &self.service_secret
            }
        };

        let mut request = self.client.request(method, url).bearer_auth(bearer);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            warn!(resource, error = %err, "Upstream request failed");
            ApiError::upstream_unreachable()
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| {
            warn!(resource, error = %err, "Reading upstream response failed");
            ApiError::upstream_unreachable()
        })?;

        if (200..300).contains(&status) {
            return Ok(UpstreamResponse {
                status,
                body: bytes.to_vec(),
            });
        }

        // Error bodies are JSON when the backend is behaving; fall back to
        // the raw text when it is not.
        let detail: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();
        let message = detail
            .as_ref()
            .and_then(|detail| detail.get("message").or_else(|| detail.get("error")))
            .and_then(|message| message.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());

        error!(resource, status, "Upstream returned an error");

        Err(ApiError::Upstream {
            status,
            message,
            error: detail,
        })
    }
}
