//! Certification firm proxy routes

use actix_web::web::{Data, Path};
use actix_web::{HttpRequest, HttpResponse, get};

use crate::error::ApiError;
use crate::model::Model;
use crate::service::{check_public_page, require_session, validate_id};
use crate::upstream::Credential;

/// Firm directory; search terms travel in the query string
#[get("/firms")]
pub async fn list(req: HttpRequest, model: Data<Model>) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let response = model
        .upstream()
        .get(
            "firms",
            "firms",
            req.query_string(),
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Single firm by id
#[get("/firms/{id}")]
pub async fn fetch(
    req: HttpRequest,
    id: Path<String>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let id = validate_id(&id, "firm")?;
    let response = model
        .upstream()
        .get(
            "firms",
            &format!("firms/{id}"),
            "",
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Firm listing for the public marketing pages
#[get("/public/firms")]
pub async fn public_list(req: HttpRequest, model: Data<Model>) -> Result<HttpResponse, ApiError> {
    check_public_page(&req, &model)?;
    let response = model
        .upstream()
        .get("firms", "firms", req.query_string(), Credential::Service)
        .await?;
    Ok(response.into_http())
}
