//! Certification catalogue proxy routes

use actix_web::web::{Data, Path};
use actix_web::{HttpRequest, HttpResponse, get};

use crate::error::ApiError;
use crate::model::Model;
use crate::service::{check_public_page, require_session, validate_id};
use crate::upstream::Credential;

/// Certification catalogue; search terms travel in the query string
#[get("/certifications")]
pub async fn list(req: HttpRequest, model: Data<Model>) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let response = model
        .upstream()
        .get(
            "certifications",
            "certifications",
            req.query_string(),
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Single certification by id
#[get("/certifications/{id}")]
pub async fn fetch(
    req: HttpRequest,
    id: Path<String>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let session = require_session(&req)?;
    let id = validate_id(&id, "certification")?;
    let response = model
        .upstream()
        .get(
            "certifications",
            &format!("certifications/{id}"),
            "",
            Credential::Identity(&session.identity_token),
        )
        .await?;
    Ok(response.into_http())
}

/// Catalogue listing for the public marketing pages
#[get("/public/certifications")]
pub async fn public_list(req: HttpRequest, model: Data<Model>) -> Result<HttpResponse, ApiError> {
    check_public_page(&req, &model)?;
    let response = model
        .upstream()
        .get(
            "certifications",
            "certifications",
            req.query_string(),
            Credential::Service,
        )
        .await?;
    Ok(response.into_http())
}
