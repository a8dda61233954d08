use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::{debug, instrument, trace, warn};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{session, utils::cookie_values},
    config::Config,
    errors::{Error, Result},
};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present, or none of them verified
/// - Some(user): Valid JWT found and verified
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<CurrentUser> {
    let cookie_name = &config.auth.session.cookie_name;

    for token in cookie_values(&parts.headers, cookie_name) {
        match session::verify_session_token(token, config) {
            Ok(user) => return Some(user),
            // Expired tokens are expected; keep checking other cookies
            Err(e) => trace!("Session token rejected: {}", e),
        }
    }
    None
}

/// A verified session whose user is still present in the repository.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>> {
    let Some(user) = try_jwt_session_auth(parts, &state.config) else {
        trace!("No valid session cookie");
        return Ok(None);
    };

    if state.users.get(&user.username).await?.is_none() {
        debug!(username = %user.username, "Session for unknown user");
        return Ok(None);
    }

    debug!(username = %user.username, "Found session authenticated user");
    Ok(Some(user))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        authenticate(parts, state)
            .await?
            .ok_or(Error::Unauthenticated { message: None })
    }
}

/// `Option<CurrentUser>` never rejects: pages use it to redirect anonymous visitors.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Option<Self>, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!("Session lookup failed, treating request as anonymous: {}", e);
                Ok(None)
            }
        }
    }
}
