use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::Rol;

const DEV_SECRET: &str = "boda-dev-secret";

static JWT_SECRET: Lazy<String> = Lazy::new(|| match std::env::var("JWT_SECRET") {
    Ok(secret) if !secret.is_empty() => secret,
    _ => {
        warn!("JWT_SECRET not set, falling back to the development secret");
        DEV_SECRET.to_string()
    }
});

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to issue token: {0}")]
    Issue(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub rol: Rol,
    #[serde(default, rename = "bodaId")]
    pub boda_id: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

/// Who is calling, as resolved from the bearer token. Handlers receive it via
/// `Extension<Identity>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub rol: Rol,
    pub boda_id: Option<String>,
}

impl Identity {
    pub fn new(user_id: &str, rol: Rol, boda_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.to_string(),
            rol,
            boda_id: boda_id.map(str::to_string),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.rol == Rol::Admin
    }

    /// Admins manage every wedding; a couple only their own; guests none.
    pub fn can_manage(&self, boda_id: &str) -> bool {
        match self.rol {
            Rol::Admin => true,
            Rol::Novio => self.boda_id.as_deref() == Some(boda_id),
            Rol::Invitado => false,
        }
    }
}

pub fn issue_token(identity: &Identity, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: identity.user_id.clone(),
        rol: identity.rol,
        boda_id: identity.boda_id.clone(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .map_err(|e| AuthError::Issue(e.to_string()))
}

pub fn decode_token(token: &str) -> Result<Identity, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(Identity {
        user_id: data.claims.sub,
        rol: data.claims.rol,
        boda_id: data.claims.boda_id,
    })
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Resolves the caller from the bearer token and stores the [`Identity`] in the
/// request extensions. Requests without a valid token get a 401.
pub async fn auth_middleware(mut req: Request, next: Next) -> Response {
    let identity = match bearer_token(req.headers()).and_then(decode_token) {
        Ok(identity) => identity,
        Err(e) => {
            warn!(
                "Rejected request to {} {}: {}",
                req.method(),
                req.uri(),
                e
            );
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "message": e.to_string() })),
            )
                .into_response();
        }
    };

    debug!(
        "Authenticated {} as {} (boda: {:?})",
        identity.user_id, identity.rol, identity.boda_id
    );
    req.extensions_mut().insert(identity);
    next.run(req).await
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

/// Builds a request authenticated as `identity`, with an optional JSON body.
#[cfg(feature = "test_utils")]
pub fn create_test_request(
    method: &str,
    uri: &str,
    identity: &Identity,
    body: Option<serde_json::Value>,
) -> axum::http::Request<axum::body::Body> {
    let token = issue_token(identity, Duration::hours(1)).expect("test token");
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .expect("test request"),
        None => builder
            .body(axum::body::Body::empty())
            .expect("test request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let identity = Identity::new("user-1", Rol::Novio, Some("boda-1"));
        let token = issue_token(&identity, Duration::hours(1)).unwrap();
        assert_eq!(decode_token(&token).unwrap(), identity);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let identity = Identity::new("user-1", Rol::Admin, None);
        let token = issue_token(&identity, Duration::hours(-2)).unwrap();
        assert!(matches!(
            decode_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_can_manage() {
        let admin = Identity::new("a", Rol::Admin, None);
        let novio = Identity::new("n", Rol::Novio, Some("boda-1"));
        let invitado = Identity::new("i", Rol::Invitado, Some("boda-1"));
        assert!(admin.can_manage("boda-2"));
        assert!(novio.can_manage("boda-1"));
        assert!(!novio.can_manage("boda-2"));
        assert!(!invitado.can_manage("boda-1"));
    }

    #[test]
    fn test_password_hash() {
        let hash = hash_password("secreto", "salt-1");
        assert!(verify_password("secreto", "salt-1", &hash));
        assert!(!verify_password("secreto", "salt-2", &hash));
        assert!(!verify_password("otro", "salt-1", &hash));
    }
}
