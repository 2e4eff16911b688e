//! Checkout bridging routes

use actix_web::web::{Data, Json};
use actix_web::{HttpRequest, HttpResponse, post};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::model::Model;
use crate::model::checkout::CheckoutIntent;
use crate::service::{fingerprint, require_session};
use crate::upstream::Credential;

/// Body of the pre-auth plan selection request
#[derive(Debug, Deserialize)]
struct IntentRequest {
    #[serde(default)]
    price_id: String,
    #[serde(default)]
    success_url: String,
    #[serde(default)]
    cancel_url: String,
    trial_days: Option<u32>,
}

/// Parks a plan selection before the visitor signs in
#[post("/checkout/intent")]
pub async fn create_intent(
    req: HttpRequest,
    body: Json<IntentRequest>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let plan = model
        .plans()
        .get(&body.price_id)
        .ok_or_else(|| ApiError::Validation("Invalid price_id".to_owned()))?;

    if body.success_url.trim().is_empty() || body.cancel_url.trim().is_empty() {
        return Err(ApiError::Validation("Missing redirect URLs".to_owned()));
    }

    let intent = CheckoutIntent {
        trial_days: body.trial_days.or(plan.trial_days),
        price_id: body.price_id,
        success_url: body.success_url,
        cancel_url: body.cancel_url,
        created_at: Utc::now(),
    };

    info!(price_id = %intent.price_id, "Parked a checkout intent");
    let expires_at = model.checkout().store(fingerprint(&req), intent).await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "expires_at": expires_at.to_rfc3339() },
    })))
}

/// Resumes the parked plan selection after sign-in and opens the checkout
/// session upstream. The intent is consumed even when the upstream call
/// fails; retrying the purchase starts over from plan selection.
#[post("/checkout/session")]
pub async fn create_session(
    req: HttpRequest,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;

    let intent = model
        .checkout()
        .consume(&fingerprint(&req))
        .await
        .ok_or_else(|| ApiError::Validation("No pending checkout for this client".to_owned()))?;

    info!(price_id = %intent.price_id, "Resuming a parked checkout intent");

    let response = model
        .upstream()
        .post(
            "checkout",
            "billing/checkout",
            &serde_json::to_value(&intent)?,
            Credential::Identity(&session.identity_token),
        )
        .await?;

    Ok(response.into_http())
}
