//! axum extractors that turn an `Authorization: Bearer` header into a
//! caller identity.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::api::ApiErrorResponse;
use crate::error::{HcmError, HcmResult};

use super::JwtKeys;

/// An authenticated caller. Rejects with 401 when the header is missing or
/// the token does not verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// The verified user id.
    pub user_id: u64,
}

/// An optional caller. An absent header yields `None`; a present but
/// invalid token still rejects with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

fn bearer_user(parts: &Parts, keys: &JwtKeys) -> HcmResult<Option<AuthUser>> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HcmError::Unauthorized {
            message: "Authorization header must be 'Bearer <token>'".to_string(),
        })?;
    let claims = keys.verify(token)?;
    Ok(Some(AuthUser {
        user_id: claims.user_id,
    }))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        match bearer_user(parts, &keys) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(HcmError::Unauthorized {
                message: "Authorization header required".to_string(),
            }
            .into()),
            Err(err) => {
                debug!(error = %err, "Rejected bearer token");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        bearer_user(parts, &keys).map(MaybeAuthUser).map_err(|err| {
            debug!(error = %err, "Rejected bearer token");
            err.into()
        })
    }
}
