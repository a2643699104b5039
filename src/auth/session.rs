//! Session tokens.
//!
//! A token is an HS256 JWT whose `jti` names a row in the `sessions` table.
//! It resolves only while the signature checks out, `exp` has not passed,
//! and the row still exists, so deleting the row revokes the token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::auth::verify_password;
use crate::db::{DbPool, NewSession, SessionRepository, User, UserRepository, SQL_DATETIME_FORMAT};
use crate::{Result, VaultError};

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 24 * 60 * 60;

/// Longest accepted session lifetime (one year).
const MAX_SESSION_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// JWT ID, matched against `sessions.token_id`.
    pub jti: String,
}

/// Issues, resolves and revokes session tokens.
#[derive(Clone)]
pub struct SessionAuthority {
    pool: DbPool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionAuthority {
    /// Create a new authority signing with `secret`.
    pub fn new(pool: DbPool, secret: &str, lifetime_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            pool,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::seconds(lifetime_secs.min(MAX_SESSION_DURATION_SECS) as i64),
        }
    }

    /// Check credentials and issue a token.
    ///
    /// Returns `Ok(None)` for an unknown email or a wrong password.
    pub async fn connect(&self, email: &str, password: &str) -> Result<Option<String>> {
        let Some(user) = UserRepository::new(&self.pool).get_by_email(email).await? else {
            debug!("Connect attempt for unknown email");
            return Ok(None);
        };

        if verify_password(password, &user.password).is_err() {
            debug!(user_id = user.id, "Connect attempt with wrong password");
            return Ok(None);
        }

        self.issue(&user).await.map(Some)
    }

    /// Issue a token for `user` and record its session.
    pub async fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expires_at = now + self.lifetime;
        let claims = JwtClaims {
            sub: user.id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                error!("Failed to encode JWT: {}", e);
                VaultError::Auth(e.to_string())
            })?;

        SessionRepository::new(&self.pool)
            .create(&NewSession {
                user_id: user.id,
                token_id: claims.jti,
                expires_at: expires_at.format(SQL_DATETIME_FORMAT).to_string(),
            })
            .await?;

        info!(user_id = user.id, "Session opened");
        Ok(token)
    }

    /// Resolve a token to its user ID, or `None` if it is not live.
    pub async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        let Some(claims) = self.decode(token) else {
            return Ok(None);
        };

        let session = SessionRepository::new(&self.pool)
            .get_valid(&claims.jti)
            .await?;

        Ok(session
            .filter(|s| s.user_id == claims.sub)
            .map(|s| s.user_id))
    }

    /// Revoke a token. Returns `false` if it was not live.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let Some(claims) = self.decode(token) else {
            return Ok(false);
        };

        let deleted = SessionRepository::new(&self.pool)
            .delete(&claims.jti)
            .await?;
        if deleted {
            info!(user_id = claims.sub, "Session closed");
        }
        Ok(deleted)
    }

    fn decode(&self, token: &str) -> Option<JwtClaims> {
        match decode::<JwtClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("JWT validation failed: {}", e);
                None
            }
        }
    }
}
