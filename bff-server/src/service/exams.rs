//! Exam generation proxy routes

use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse, get, post};
use tracing::info;

use crate::error::ApiError;
use crate::model::Model;
use crate::service::{require_session, validate_id};
use crate::upstream::Credential;

/// Kicks off practice exam generation on the backend
#[post("/exams")]
pub async fn generate(
    req: HttpRequest,
    body: Json<serde_json::Value>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    info!("Requested exam generation");
    let response = model
        .upstream()
        .post(
            "exams",
            "exams",
            &body,
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Generation status, polled by the UI until the exam is ready
#[get("/exams/{id}")]
pub async fn status(
    req: HttpRequest,
    id: Path<String>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let id = validate_id(&id, "exam")?;
    let response = model
        .upstream()
        .get(
            "exams",
            &format!("exams/{id}"),
            "",
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}
