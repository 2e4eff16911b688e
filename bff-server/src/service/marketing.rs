//! Marketing list subscription route

use actix_web::web::{Bytes, Data};
use actix_web::{HttpResponse, post};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::model::Model;
use crate::upstream::Credential;

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    #[serde(default)]
    email: String,
}

/// Adds an email to the marketing list.
///
/// Deliberately never fails the HTTP exchange: a broken marketing pipeline
/// must not block signup, so every outcome is a 200 with `success` set
/// accordingly. The body is parsed leniently for the same reason.
#[post("/marketing/subscribe")]
pub async fn subscribe(body: Bytes, model: Data<Model>) -> HttpResponse {
    let email = serde_json::from_slice::<SubscribeRequest>(&body)
        .map(|request| request.email)
        .unwrap_or_default();
    let email = email.trim();

    if email.is_empty() {
        return HttpResponse::Ok().json(json!({
            "success": false,
            "error": "Email is required",
        }));
    }

    let sent = model
        .upstream()
        .post(
            "marketing",
            "marketing/subscribe",
            &json!({ "email": email }),
            Credential::Service,
        )
        .await;

    match sent {
        Ok(_) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(err) => {
            warn!(error = %err, "Marketing subscription failed");
            HttpResponse::Ok().json(json!({
                "success": false,
                "error": err.to_string(),
            }))
        }
    }
}
