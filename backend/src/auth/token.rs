//! Token signing and verification
//!
//! Tokens carry the full sanitized identity (id, role, email plus public
//! profile fields) so handlers can read profile data without a second store
//! round-trip. The trade-off is staleness: profile edits are not reflected
//! in an already-issued token until re-login.
//!
//! Keys are pre-computed once at startup and cached in AppState; key
//! derivation never happens per request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use campusbridge_shared::types::Role;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Claim keys that must never be signed into a token
const FORBIDDEN_CLAIMS: &[&str] = &["password", "passwordHash", "password_hash"];

/// Token errors. `Expired` and `Invalid` are distinguished for logging but
/// collapse to the same unauthorized outcome at the boundary.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("unsignable claims: {0}")]
    Claims(String),
}

/// Signed claim set
///
/// Current tokens carry the account id in `id`; legacy deployments used the
/// standard `sub` claim instead. The verifier accepts either and normalizes
/// to `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Uuid>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub role: Role,
    pub email: String,
    /// Denormalized public profile fields
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

/// Normalized identity attached to a request after verification.
/// One per request, never persisted.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    /// Public profile claims carried by the token (no exp/iat, no hash)
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl AuthIdentity {
    /// Render the identity as the sanitized profile object handlers return
    pub fn profile_json(&self) -> serde_json::Value {
        let mut object = self.claims.clone();
        object.insert("id".to_string(), serde_json::json!(self.id));
        object.insert("role".to_string(), serde_json::json!(self.role));
        object.insert("email".to_string(), serde_json::json!(self.email));
        serde_json::Value::Object(object)
    }

    /// Role gate for routes owned by one identity variant.
    /// Admins pass every gate.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role || self.role == Role::Admin
    }
}

/// Pre-computed signing keys, wrapped in Arc for cheap cloning
#[derive(Clone)]
struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

/// Token service: signs and verifies the identity claim set.
///
/// Create once at startup from the configured secret and store in AppState.
#[derive(Clone)]
pub struct TokenService {
    keys: TokenKeys,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            keys: TokenKeys {
                encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
                decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            },
            expiry_secs,
        }
    }

    /// Sign a sanitized profile into a token.
    ///
    /// The profile must serialize to an object carrying `id`, `role` and
    /// `email`. A claim set containing a password hash is refused outright.
    pub fn sign<T: Serialize>(&self, profile: &T) -> Result<String, TokenError> {
        let value = serde_json::to_value(profile)
            .map_err(|e| TokenError::Claims(e.to_string()))?;
        let serde_json::Value::Object(mut fields) = value else {
            return Err(TokenError::Claims("profile must be an object".to_string()));
        };

        for key in FORBIDDEN_CLAIMS {
            if fields.contains_key(*key) {
                return Err(TokenError::Claims(format!(
                    "claim set must not contain `{}`",
                    key
                )));
            }
        }

        let id = fields
            .remove("id")
            .and_then(|v| serde_json::from_value::<Uuid>(v).ok())
            .ok_or_else(|| TokenError::Claims("profile is missing `id`".to_string()))?;
        let role = fields
            .remove("role")
            .and_then(|v| serde_json::from_value::<Role>(v).ok())
            .ok_or_else(|| TokenError::Claims("profile is missing `role`".to_string()))?;
        let email = fields
            .remove("email")
            .and_then(|v| serde_json::from_value::<String>(v).ok())
            .ok_or_else(|| TokenError::Claims("profile is missing `email`".to_string()))?;

        let now = Utc::now();
        let claims = Claims {
            id: Some(id),
            sub: None,
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
            iat: now.timestamp(),
            role,
            email,
            profile: fields,
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Claims(e.to_string()))
    }

    /// Verify a token and return the normalized identity.
    pub fn verify(&self, token: &str) -> Result<AuthIdentity, TokenError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        let claims = data.claims;
        let id = claims
            .id
            .or(claims.sub)
            .ok_or_else(|| TokenError::Invalid("token carries no id claim".to_string()))?;

        Ok(AuthIdentity {
            id,
            role: claims.role,
            email: claims.email,
            claims: claims.profile,
        })
    }

    /// Token lifetime, shared with the session cookie max-age
    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}
