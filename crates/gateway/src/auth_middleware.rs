use {
    axum::{
        extract::State,
        http::{HeaderMap, header},
        middleware::Next,
        response::{IntoResponse, Response},
    },
    tracing::{debug, warn},
};

use crate::{
    error::{ApiError, unauthorized},
    server::AppState,
    state::GatewayState,
};

/// Identity of an authenticated request, inserted into request extensions
/// by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub token: String,
}

/// Session token from the session cookie, or from `Authorization: Bearer`.
pub fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if let Some(token) = parse_cookie(cookie_header, cookie_name).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the request's session to a user. `Ok(None)` when there is no
/// token or the session is unknown or expired.
pub async fn authenticate(
    state: &GatewayState,
    headers: &HeaderMap,
) -> chatlabs_store::Result<Option<AuthUser>> {
    let Some(token) = session_token(headers, &state.config.auth.session_cookie) else {
        return Ok(None);
    };
    let user = state
        .stores
        .sessions
        .user_for_session(token)
        .await?
        .map(|user_id| AuthUser {
            user_id,
            token: token.to_string(),
        });
    if user.is_none() {
        debug!("request carried an unknown or expired session");
    }
    Ok(user)
}

/// Middleware that protects API routes. Accepts the session cookie or an
/// `Authorization: Bearer <session token>` header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth = authenticate(&state.gateway, request.headers()).await;
    match auth {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        },
        Ok(None) => unauthorized(),
        Err(e) => {
            warn!(error = %e, "session lookup failed");
            ApiError::Internal.into_response()
        },
    }
}

/// Parse a specific cookie value from a Cookie header string.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value);
        }
    }
    None
}
