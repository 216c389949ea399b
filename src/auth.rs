use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    guard::{self, TokenVerdict, TokenVerifier},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the signed session token. Signed with the server secret at
/// login and validated on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the UUID of the user the session belongs to.
    pub sub: Uuid,
    /// Role attribute at issuance time ("administrator" or "editor").
    /// Handlers re-resolve the current role from the store; this copy serves
    /// the route guard, which must not touch the database.
    pub role: String,
    /// Expiration time. Tokens past this point are rejected.
    pub exp: usize,
    /// Issued-at time.
    pub iat: usize,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// issue_token
///
/// Signs a session token for the given user. Called by the login handler
/// after credential verification succeeds.
pub fn issue_token(
    user_id: Uuid,
    role: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// decode_token
///
/// Validates signature and expiry, returning the embedded claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

/// JwtVerifier
///
/// The concrete `TokenVerifier` used in production: a token is valid when it
/// decodes under the configured secret and has not expired. Decode failures
/// of any kind collapse into an invalid verdict; the guard treats them the
/// same as a missing token.
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> TokenVerdict {
        match decode_token(token, &self.secret) {
            Ok(claims) => TokenVerdict {
                valid: true,
                role: Some(claims.role),
            },
            Err(_) => TokenVerdict::default(),
        }
    }
}

/// hash_password
///
/// Argon2id hash of a plaintext password with a fresh random salt, in PHC
/// string format ready for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// verify_password
///
/// Checks a plaintext password against a stored PHC hash. A malformed stored
/// hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// AuthUser
///
/// Resolved identity of an authenticated request. Admin handlers take this as
/// an argument, which re-checks the session independently of the route guard:
/// the token is decoded again and the user re-fetched from the store, so a
/// deleted account cannot ride a token issued before its removal.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    /// Current role from the store, not the (possibly stale) token copy.
    pub role: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = guard::extract_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing session token".to_string()))?;

        let claims = decode_token(&token, &config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("invalid or expired session".to_string()))?;

        let user = repo
            .get_user(claims.sub)
            .await
            .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn issued_token_verifies() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "editor", SECRET, 3600).unwrap();

        let verdict = JwtVerifier::new(SECRET).verify(&token);
        assert!(verdict.valid);
        assert_eq!(verdict.role.as_deref(), Some("editor"));

        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = issue_token(Uuid::new_v4(), "editor", SECRET, 3600).unwrap();
        let verdict = JwtVerifier::new("another-secret").verify(&token);
        assert!(!verdict.valid);
        assert!(verdict.role.is_none());
    }

    #[test]
    fn garbage_token_fails_verification() {
        let verdict = JwtVerifier::new(SECRET).verify("not.a.token");
        assert!(!verdict.valid);
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        assert!(!verify_password("hunter2", "plainly-not-a-phc-string"));
    }
}
