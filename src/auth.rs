use argon2::Argon2;
use axum::{
    extract::{FromRequest, RequestParts},
    headers::{authorization::Bearer, Authorization},
    http::{header::AUTHORIZATION, StatusCode},
    TypedHeader,
};
use jsonwebtoken::{
    errors::Result as JwtResult, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use nanoid::nanoid;
use password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    domain::{models::AdminId, Session},
    error::{AppError, AppResult},
    AppState,
};

pub fn hash_password(password: impl AsRef<[u8]>) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_ref(), &salt)
        .map(|h| h.to_string())
}

pub fn verify_password(
    password: impl AsRef<[u8]>,
    password_hash: impl AsRef<str>,
) -> password_hash::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash.as_ref())?;
    Ok(Argon2::default()
        .verify_password(password.as_ref(), &parsed_hash)
        .is_ok())
}

pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    pub fn from_base64_secret(secret: &str) -> JwtResult<Keys> {
        Ok(Keys {
            encoding: EncodingKey::from_base64_secret(secret)?,
            decoding: DecodingKey::from_base64_secret(secret)?,
        })
    }

    /// A per-process key. Tokens do not survive a restart.
    pub fn random() -> Keys {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Keys {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AdminId,
    pub jti: String,
    pub exp: u64,
}

pub fn generate_jwt(keys: &Keys, admin_id: AdminId, ttl: Duration) -> JwtResult<(String, Claims)> {
    let claims = Claims {
        sub: admin_id,
        jti: nanoid!(),
        exp: jsonwebtoken::get_current_timestamp().saturating_add(ttl.as_secs()),
    };
    let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding)?;
    Ok((token, claims))
}

pub fn validate_jwt(keys: &Keys, token: &str) -> JwtResult<TokenData<Claims>> {
    jsonwebtoken::decode::<Claims>(token, &keys.decoding, &Validation::default())
}

/// Token ids revoked by logout, kept until the token would have expired anyway.
#[derive(Clone, Default)]
pub struct Revocations(Arc<Mutex<HashMap<String, u64>>>);

impl Revocations {
    pub async fn revoke(&self, token_id: impl Into<String>, expires_at: u64) {
        let now = jsonwebtoken::get_current_timestamp();
        let mut revoked = self.0.lock().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(token_id.into(), expires_at);
    }

    pub async fn is_revoked(&self, token_id: &str) -> bool {
        self.0.lock().await.contains_key(token_id)
    }

    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }
}

/// An authenticated request: the session plus the token that carried it.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session: Session,
    pub token_id: String,
    pub expires_at: u64,
}

/// Requires a valid bearer token.
pub struct ExtractAuth(pub CurrentSession);

/// Resolves a bearer token when one is sent; anonymous otherwise.
pub struct OptionalAuth(pub Session);

fn unauthorized(message: &'static str) -> AppError {
    AppError::from(StatusCode::UNAUTHORIZED, message)
}

async fn resolve_session<B: Send>(req: &mut RequestParts<B>) -> AppResult<Option<CurrentSession>> {
    if !req.headers().contains_key(AUTHORIZATION) {
        return Ok(None);
    }

    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request(req)
            .await
            .map_err(|_| unauthorized("malformed authorization header"))?;
    let state = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("application state is not installed"))?;

    let claims = validate_jwt(&state.keys, bearer.token())
        .map_err(|e| {
            debug!(error = %e, "bearer token rejected");
            unauthorized("invalid or expired token")
        })?
        .claims;

    if state.revocations.is_revoked(&claims.jti).await {
        return Err(unauthorized("token has been revoked"));
    }

    let Some(admin) = state.registry.by_id(claims.sub) else {
        warn!(admin_id = %claims.sub, "token refers to an unknown administrator");
        return Err(unauthorized("invalid or expired token"));
    };

    Ok(Some(CurrentSession {
        session: Session::authenticated(admin.clone()),
        token_id: claims.jti,
        expires_at: claims.exp,
    }))
}

#[axum::async_trait]
impl<B: Send> FromRequest<B> for ExtractAuth {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        resolve_session(req)
            .await?
            .map(ExtractAuth)
            .ok_or_else(|| unauthorized("missing bearer token"))
    }
}

#[axum::async_trait]
impl<B: Send> FromRequest<B> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let session = resolve_session(req)
            .await?
            .map_or_else(Session::anonymous, |current| current.session);
        Ok(OptionalAuth(session))
    }
}
