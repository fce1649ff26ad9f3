//! Bearer tokens carrying the caller's account state and capabilities.
//!
//! Tokens are HS256 JWTs issued by the user directory. The board only
//! verifies them; [`issue_token`] exists for tooling and tests.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use kanban_core::authorization::{Actor, Permission, UserState};
use kanban_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_TOKEN_TTL_MINS: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id in the user directory.
    pub sub: DbId,
    pub state: UserState,
    /// Capability names, e.g. `GET_COLUMN`.
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// Claims describing `actor`, valid for `ttl_mins` from now.
    pub fn for_actor(actor: &Actor, ttl_mins: i64) -> Self {
        let now = Utc::now().timestamp();
        let mut permissions: Vec<String> =
            actor.permissions.iter().map(|p| p.to_string()).collect();
        permissions.sort();

        Self {
            sub: actor.id,
            state: actor.state,
            permissions,
            exp: now + ttl_mins * 60,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// The caller these claims describe. Capability names this service does
    /// not know are dropped.
    pub fn actor(&self) -> Actor {
        let permissions = self
            .permissions
            .iter()
            .filter_map(|name| name.parse::<Permission>().ok());
        Actor::new(self.sub, self.state, permissions)
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens produced by [`issue_token`].
    pub token_ttl_mins: i64,
}

impl JwtConfig {
    /// | Env Var          | Required | Default |
    /// |------------------|----------|---------|
    /// | `JWT_SECRET`     | **yes**  | --      |
    /// | `JWT_TTL_MINS`   | no       | `15`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        let token_ttl_mins = match std::env::var("JWT_TTL_MINS") {
            Ok(raw) => raw.parse().expect("JWT_TTL_MINS must be a valid i64"),
            Err(_) => DEFAULT_TOKEN_TTL_MINS,
        };

        Self {
            secret,
            token_ttl_mins,
        }
    }
}

/// Sign a token for `actor`.
pub fn issue_token(actor: &Actor, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::for_actor(actor, config.token_ttl_mins);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
