//! HTTP surface of the gateway

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, delete, middleware, post, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;


mod certifications;
mod checkout;
mod exams;
mod firms;
mod marketing;
mod session;
mod subscriptions;

use crate::error::ApiError;
use crate::model::Model;
use crate::model::auth::{AuthError, IdentityToken, Session};
use crate::model::checkout::Fingerprint;
use session::SESSION_COOKIE;

/// Body of the session issuance request
#[derive(Debug, Deserialize)]
struct IssueSessionRequest {
    #[serde(default)]
    token: String,
}

/// Wraps a client-obtained identity token into the session cookie.
///
/// The token is taken on trust here; it is checked no earlier than the
/// first verified request.
#[post("/session")]
async fn issue_session(
    body: web::Json<IssueSessionRequest>,
    model: Data<Model>,
) -> Result<HttpResponse, ApiError> {
    let token = body.token.trim();
    if token.is_empty() {
        return Err(ApiError::Validation("Missing identity token".to_owned()));
    }

    let issued = model.sessions().issue(&IdentityToken::new(token))?;
    info!("Issued a session envelope");

    let max_age = (issued.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = Cookie::build(SESSION_COOKIE, issued.token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(max_age))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "data": { "expires_at": issued.expires_at.to_rfc3339() },
    })))
}

/// Destroys the session cookie and any parked checkout intent
#[delete("/session")]
async fn reset_session(req: HttpRequest, model: Data<Model>) -> HttpResponse {
    model.checkout().clear(&fingerprint(&req)).await;

    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();

    info!("Session reset");
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "success": true }))
}

/// Returns the verified session attached by the middleware
pub(crate) fn require_session(req: &HttpRequest) -> Result<Session, ApiError> {
    req.extensions()
        .get::<Session>()
        .cloned()
        .ok_or(ApiError::Authentication(AuthError::MissingToken))
}

/// Structural check for path identifiers before they are forwarded upstream
pub(crate) fn validate_id<'a>(id: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let well_formed = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(id)
    } else {
        Err(ApiError::Validation(format!("Invalid {what} id")))
    }
}

/// Allow-list check for the public listing routes: the caller must name a
/// recognized public page in its `Origin` or `Referer`. Not authentication.
pub(crate) fn check_public_page(req: &HttpRequest, model: &Model) -> Result<(), ApiError> {
    let headers = req.headers();
    let origin = headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::AccessDenied)?;

    let host = reqwest::Url::parse(origin)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .ok_or(ApiError::AccessDenied)?;

    if model.public_origins().iter().any(|allowed| *allowed == host) {
        Ok(())
    } else {
        Err(ApiError::AccessDenied)
    }
}

/// Derives the visitor correlation key from request characteristics
pub(crate) fn fingerprint(req: &HttpRequest) -> Fingerprint {
    let headers = req.headers();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let connection = req.connection_info();
    let peer = connection.realip_remote_addr().unwrap_or("unknown");

    Fingerprint::derive(user_agent, accept_language, peer)
}

/// Returns configuration function for the ActixWeb services
pub async fn configure(model: Model) -> color_eyre::Result<impl Fn(&mut ServiceConfig) + Clone> {
    let cfg = move |cfg: &mut ServiceConfig| {
        let verified = web::scope("")
            .wrap(middleware::from_fn(session::middleware))
            .service(certifications::list)
            .service(certifications::fetch)
            .service(firms::list)
            .service(firms::fetch)
            .service(exams::generate)
            .service(exams::status)
            .service(subscriptions::list)
            .service(subscriptions::create)
            .service(subscriptions::update)
            .service(subscriptions::cancel)
            .service(checkout::create_session);

        cfg.app_data(Data::new(model.clone()))
            .service(issue_session)
            .service(reset_session)
            .service(certifications::public_list)
            .service(firms::public_list)
            .service(checkout::create_intent)
            .service(marketing::subscribe)
            .service(verified);
    };

    Ok(cfg)
}
