//! Session verification middleware

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, ResponseError};

use crate::error::ApiError;
use crate::model::Model;
use crate::model::auth::{AuthError, Session, SessionToken};

/// Cookie carrying the session envelope
pub const SESSION_COOKIE: &str = "session";

/// Verifies the session envelope in front of every protected route.
///
/// On success the unwrapped [`Session`](crate::model::auth::Session) lands in
/// the request extensions; any failure ends the request with the 401
/// envelope before the handler runs.
pub async fn middleware<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error>
where
    B: MessageBody + 'static,
{
    match authenticate(&req).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            Ok(next.call(req).await?.map_into_boxed_body())
        }
        // End the request with the error envelope before the handler runs.
        // This renders the same 401 response the framework would produce from
        // a bubbled error, so the rejection is observable to the caller.
        Err(err) => Ok(req.into_response(err.error_response())),
    }
}

/// Resolves the verified session for the request, or the error that rejects it.
async fn authenticate(req: &ServiceRequest) -> Result<Session, ApiError> {
    let token = extract_token(req)?;

    let model: Data<Model> = req
        .app_data()
        .cloned()
        .ok_or_else(|| ApiError::Internal("Missing service context".to_owned()))?;

    let session = model
        .sessions()
        .verify(&token)
        .await
        .map_err(ApiError::Authentication)?;

    Ok(session)
}

/// Pulls the envelope from the session cookie, falling back to an
/// `Authorization: Session <token>` header.
fn extract_token(req: &ServiceRequest) -> Result<SessionToken, ApiError> {
    if let Some(cookie) = req.request().cookie(SESSION_COOKIE) {
        return Ok(SessionToken::from(cookie.value()));
    }

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Authentication(AuthError::MissingToken))?;

    let header = header
        .to_str()
        .map_err(|_| ApiError::Authentication(AuthError::MalformedAuthorization))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(ApiError::Authentication(AuthError::MalformedAuthorization))?;

    if scheme != "Session" {
        return Err(ApiError::Authentication(AuthError::InvalidScheme));
    }

    Ok(SessionToken::from(token))
}
