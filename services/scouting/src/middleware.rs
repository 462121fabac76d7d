//! Session middleware
//!
//! Every request is bound to a browsing session. The session id travels in
//! the `x-session-id` header; the carried auth token in the `auth` query
//! parameter. Responses tell the client what to store next:
//!
//! - `x-session-id`: the session to send on the next request
//! - `x-auth-token`: a fresh token to carry, or an empty value when the
//!   carried token must be dropped

use auth::{
    carrier::{AUTH_PARAM, CarrierUpdate},
    session::SessionState,
};
use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Header carrying the browsing session id
pub const SESSION_HEADER: &str = "x-session-id";
/// Header carrying the token the client should keep under `auth`
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Session attached to the request by [`session_middleware`]
///
/// A copy taken when the request arrived; handlers write changes back
/// through [`crate::sessions::SessionRegistry::update`].
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionState);

#[derive(Debug, Default, Deserialize)]
struct CarrierParams {
    auth: Option<String>,
}

/// Resolve the browsing session and rebuild it from the carried token
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_id = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok());

    let carried_token = Query::<CarrierParams>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(params)| params.auth)
        .filter(|token| !token.is_empty());

    let session = state
        .sessions
        .resolve(session_id, |session| {
            state
                .reconstructor
                .reconstruct(carried_token.as_deref(), session)
        })
        .await;
    let id = session.session_id();

    debug!(
        "Request for session {} (authenticated: {})",
        id,
        session.is_authenticated()
    );
    req.extensions_mut().insert(CurrentSession(session.clone()));

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        headers.insert(SESSION_HEADER, value);
    }

    if !headers.contains_key(AUTH_TOKEN_HEADER) {
        let latest = state.sessions.get(id).await.unwrap_or(session);
        let update = match state.reconstructor.keep_alive(&latest) {
            CarrierUpdate::Unchanged if carried_token.is_some() => {
                debug!("Dropping carried {} token for session {}", AUTH_PARAM, id);
                CarrierUpdate::Remove
            }
            update => update,
        };
        set_carrier_header(headers, update);
    }

    response
}

/// Reject requests whose session is not authenticated
pub async fn require_login(req: Request, next: Next) -> Result<Response, ApiError> {
    let authenticated = req
        .extensions()
        .get::<CurrentSession>()
        .is_some_and(|CurrentSession(session)| session.is_authenticated());

    if !authenticated {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Write a carrier update into the response headers
pub fn set_carrier_header(headers: &mut HeaderMap, update: CarrierUpdate) {
    match update {
        CarrierUpdate::Set(token) => match HeaderValue::from_str(&token) {
            Ok(value) => {
                headers.insert(AUTH_TOKEN_HEADER, value);
            }
            Err(e) => warn!("Token is not a valid header value: {}", e),
        },
        CarrierUpdate::Remove => {
            headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static(""));
        }
        CarrierUpdate::Unchanged => {}
    }
}
