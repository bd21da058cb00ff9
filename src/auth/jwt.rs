//! Bearer token issue and verification.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{HcmError, HcmResult};

/// Claims carried in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub user_id: u64,
    /// Expiry, in seconds since the Unix epoch.
    pub exp: u64,
}

/// HS256 signing material plus token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Builds keys from a shared secret. Tokens live for `ttl_hours`.
    pub fn from_secret(secret: &[u8], ttl_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: ttl_hours * 3600,
        }
    }

    /// Issues a token for `user_id`, expiring `ttl_hours` from now.
    pub fn issue(&self, user_id: u64) -> HcmResult<String> {
        let claims = Claims {
            user_id,
            exp: jsonwebtoken::get_current_timestamp() + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            HcmError::Internal {
                message: format!("failed to issue token: {}", e),
            }
        })
    }

    /// Verifies signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> HcmResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| HcmError::Unauthorized {
                message: format!("Invalid token: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let keys = JwtKeys::from_secret(b"test-secret", 24);
        let token = keys.issue(7).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert!(claims.exp > jsonwebtoken::get_current_timestamp());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = JwtKeys::from_secret(b"one", 24).issue(7).unwrap();
        let result = JwtKeys::from_secret(b"two", 24).verify(&token);
        assert!(matches!(result, Err(HcmError::Unauthorized { .. })));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret", 24);
        let stale = Claims {
            user_id: 7,
            exp: jsonwebtoken::get_current_timestamp() - 3600,
        };
        let token = encode(&Header::default(), &stale, &EncodingKey::from_secret(b"test-secret")).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret", 24);
        assert!(keys.verify("not.a.token").is_err());
    }
}
