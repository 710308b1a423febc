//! JWT authentication for the query API.
//!
//! Tokens are short-lived HS256 JWTs carrying the username as subject plus an
//! expiry claim. Credential checking sits behind [`CredentialVerifier`] so the
//! production env-sourced pair can be swapped for a fixed pair in tests.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Claims encoded into access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

/// Signing/validation keys plus token lifetime.
#[derive(Clone)]
pub struct JwtConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub ttl_minutes: u64,
}

impl JwtConfig {
    pub fn from_secret(secret: &[u8], ttl_minutes: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_minutes,
        }
    }

    /// Issue a token for `username`, expiring after the configured lifetime.
    pub fn issue_token(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: username.to_string(),
            exp: jsonwebtoken::get_current_timestamp() + self.ttl_minutes * 60,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Validate a token and return its subject. Signature and expiry are
    /// both enforced.
    pub fn decode_subject(&self, token: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims.sub)
    }
}

/// Verifies login credentials and recognizes token subjects.
pub trait CredentialVerifier: Send + Sync {
    /// Whether `username`/`password` is a valid credential pair.
    fn verify(&self, username: &str, password: &str) -> bool;

    /// Whether `username` is a known account (used when validating tokens).
    fn knows(&self, username: &str) -> bool;
}

/// Production verifier holding the single credential pair from configuration.
pub struct EnvCredentials {
    username: String,
    password: String,
}

impl EnvCredentials {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl CredentialVerifier for EnvCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Compare both fields regardless of the username outcome.
        let user_ok = username == self.username;
        let pass_ok = password == self.password;
        user_ok && pass_ok
    }

    fn knows(&self, username: &str) -> bool {
        username == self.username
    }
}

/// Fixed-pair verifier for tests.
pub struct StaticCredentials {
    pub username: &'static str,
    pub password: &'static str,
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }

    fn knows(&self, username: &str) -> bool {
        username == self.username
    }
}

/// Authenticated subject, inserted into request extensions by [`jwt_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// 401 with a bearer challenge and a machine-readable reason.
pub fn unauthorized(detail: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(json!({ "detail": detail })),
    )
        .into_response()
}

/// Middleware guarding the protected routes: requires a valid bearer token
/// whose subject is a known account.
pub async fn jwt_auth(
    Extension(config): Extension<JwtConfig>,
    Extension(verifier): Extension<Arc<dyn CredentialVerifier>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized("Missing bearer token");
    };

    let subject = match config.decode_subject(token) {
        Ok(subject) => subject,
        Err(e) => {
            debug!("Rejected token: {e}");
            return unauthorized("Invalid or expired token");
        }
    };

    if !verifier.knows(&subject) {
        debug!("Rejected token for unknown subject {subject}");
        return unauthorized("Unknown token subject");
    }

    req.extensions_mut().insert(CurrentUser(subject));
    next.run(req).await
}
