//! Credenziali: hashing delle password, emissione/verifica dei token e il gate per le rotte protette.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kcnotes_core::{unix_now, Claims};
use tracing::{debug, error};

use crate::{error::AppError, AppState};

/// Hash Argon2id con salt casuale per utente, in formato PHC (`$argon2id$v=19$...`).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` se la password non corrisponde, `Err` se l'hash salvato è malformato.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Firma e verifica dei token HS256 con il secret del servizio.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token valido da adesso per `ttl` secondi.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, AppError> {
        self.sign(&Claims::new(user_id, username, unix_now(), self.ttl))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            error!("token signing failed: {e}");
            AppError::internal()
        })
    }

    /// Claims del token se la firma è valida e il token non è scaduto.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

/// Identità del chiamante ricavata da un token verificato.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(c: Claims) -> Self {
        Self { id: c.id, username: c.username }
    }
}

/// Token dall'header `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    if !value.starts_with("Bearer") {
        return None;
    }
    value.split(' ').nth(1).filter(|t| !t.is_empty())
}

/// Gate delle rotte protette. Ogni fallimento collassa nello stesso 401.
pub fn authorize(tokens: &TokenService, headers: &HeaderMap) -> Result<Identity, AppError> {
    let token = bearer_token(headers).ok_or_else(|| {
        debug!("missing or malformed Authorization header");
        AppError::unauthorized()
    })?;
    let claims = tokens.verify(token).map_err(|e| {
        debug!("token rejected: {e}");
        AppError::unauthorized()
    })?;
    Ok(claims.into())
}

/// Extractor per gli handler protetti: se il gate fallisce l'handler non viene eseguito
/// e il client riceve direttamente il 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts.extensions.get::<Arc<AppState>>().cloned().ok_or_else(|| {
            error!("AppState extension missing from router");
            AppError::internal()
        })?;
        authorize(&state.tokens, &parts.headers).map(AuthUser)
    }
}
