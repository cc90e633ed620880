use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::ShellError,
    models::{AuthState, Profile},
    repository::ProfileStoreState,
};

/// Claims
///
/// Payload expected inside a session JWT. Signed with the configured secret and
/// validated on every request that carries one.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID, the key into `public.profiles`.
    pub sub: Uuid,
    /// Expiration Time (exp): always enforced.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// RequestSession Extractor Result
///
/// The server-side session source: the resolved `AuthState` of the caller.
/// This extractor never rejects. Missing or bad credentials resolve to `SignedOut`,
/// and a lookup that cannot complete is gated as `SignedOut` too (fail closed).
#[derive(Debug, Clone)]
pub struct RequestSession(pub AuthState);

impl<S> FromRequestParts<S> for RequestSession
where
    S: Send + Sync,
    ProfileStoreState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let profiles = ProfileStoreState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth = match resolve_session(parts, &profiles, &config).await {
            Ok(auth) => auth,
            Err(error) => {
                tracing::warn!(%error, "session unresolvable, treating as signed out");
                AuthState::SignedOut
            }
        };
        Ok(RequestSession(auth))
    }
}

/// resolve_session
///
/// 1. Local Bypass: in `Env::Local`, an `x-user-id` header naming an existing profile signs in.
/// 2. Token Extraction: `Authorization: Bearer <jwt>`; anything else is `SignedOut`.
/// 3. Token Validation: signature and expiry; failures are `SignedOut`.
/// 4. Profile Lookup: the role comes from the store, so a deleted user is `SignedOut`.
///
/// Only an unreachable store (or one slower than the configured pending timeout)
/// produces an error.
pub async fn resolve_session(
    parts: &Parts,
    profiles: &ProfileStoreState,
    config: &AppConfig,
) -> Result<AuthState, ShellError> {
    if config.env == Env::Local {
        let bypass = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());
        if let Some(user_id) = bypass {
            if let Some(profile) = lookup(profiles, user_id, config).await? {
                return Ok(signed_in(&profile));
            }
        }
    }

    let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return Ok(AuthState::SignedOut);
    };

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let claims = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                _ => tracing::debug!(error = %e, "session token rejected"),
            }
            return Ok(AuthState::SignedOut);
        }
    };

    Ok(match lookup(profiles, claims.sub, config).await? {
        Some(profile) => signed_in(&profile),
        None => AuthState::SignedOut,
    })
}

async fn lookup(
    profiles: &ProfileStoreState,
    user_id: Uuid,
    config: &AppConfig,
) -> Result<Option<Profile>, ShellError> {
    match config.routing.auth_pending_timeout {
        Some(limit) => tokio::time::timeout(limit, profiles.get_profile(user_id))
            .await
            .map_err(|_| ShellError::SessionUnresolvable(format!("profile lookup exceeded {limit:?}")))?,
        None => profiles.get_profile(user_id).await,
    }
}

fn signed_in(profile: &Profile) -> AuthState {
    AuthState::SignedIn(profile.identity())
}
