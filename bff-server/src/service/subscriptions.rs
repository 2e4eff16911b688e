//! Subscription proxy routes

use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put};

use crate::error::ApiError;
use crate::model::Model;
use crate::service::{require_session, validate_id};
use crate::upstream::Credential;

/// The caller's subscriptions
#[get("/subscriptions")]
pub async fn list(req: HttpRequest, model: Data<Model>) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let response = model
        .upstream()
        .get(
            "subscriptions",
            "subscriptions",
            req.query_string(),
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Opens a subscription, body forwarded as-is
#[post("/subscriptions")]
pub async fn create(
    req: HttpRequest,
    body: Json<serde_json::Value>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let response = model
        .upstream()
        .post(
            "subscriptions",
            "subscriptions",
            &body,
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Updates a subscription, body forwarded as-is
#[put("/subscriptions/{id}")]
pub async fn update(
    req: HttpRequest,
    id: Path<String>,
    body: Json<serde_json::Value>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let id = validate_id(&id, "subscription")?;
    let response = model
        .upstream()
        .put(
            "subscriptions",
            &format!("subscriptions/{id}"),
            &body,
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Cancels a subscription
#[delete("/subscriptions/{id}")]
pub async fn cancel(
    req: HttpRequest,
    id: Path<String>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let id = validate_id(&id, "subscription")?;
    let response = model
        .upstream()
        .delete(
            "subscriptions",
            &format!("subscriptions/{id}"),
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}
