//! Admin authentication.
//!
//! `POST /admin/login` exchanges credentials for an HS256 bearer token whose
//! `sub` is the admin id. Protected admin routes run [`admin_middleware`],
//! which verifies the token, checks the account still exists and attaches an
//! [`AdminPrincipal`] to the request.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use bedfinder_core::Admin;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{config::AuthConfig, error::Error, request_context::RequestContext, state::AppState};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminPrincipal {
    pub admin_id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    UnknownAdmin,
}

impl AuthError {
    fn message(&self) -> String {
        match self {
            Self::MissingToken => "Missing bearer token".to_string(),
            Self::InvalidToken(msg) => format!("Invalid bearer token: {msg}"),
            Self::UnknownAdmin => "Admin account no longer exists".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Error::Unauthorized(self.message()).into_response()
    }
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    issuer: String,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            issuer: config.issuer.clone(),
            ttl_seconds: config.token_ttl_seconds,
        }
    }

    pub fn issue(&self, admin: &Admin) -> Result<IssuedToken, Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX)),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Verify a token and resolve its subject to an admin id.
    pub fn principal(&self, token: &str) -> Result<AdminPrincipal, AuthError> {
        let claims = self.verify(token)?;
        let admin_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken("subject is not an admin id".to_string()))?;
        Ok(AdminPrincipal {
            admin_id,
            username: claims.username,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| {
            AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
        })?;

    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AuthError::InvalidToken("Authorization header must be 'Bearer <token>'".to_string())
        })
}

/// Extractor for the admin attached by [`admin_middleware`].
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub AdminPrincipal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminPrincipal>()
            .cloned()
            .map(AuthenticatedAdmin)
            .ok_or(AuthError::MissingToken)
    }
}

/// Reject requests without a valid admin token.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|c| c.request_id.clone())
        .unwrap_or_default();

    let principal = match bearer_token(req.headers()).and_then(|t| state.tokens.principal(t)) {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                path = %req.uri().path(),
                reason = %err.message(),
                "Rejected admin request"
            );
            return err.into_response();
        }
    };

    match state.admins.get_by_id(principal.admin_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(
                request_id = %request_id,
                admin_id = principal.admin_id,
                "Token subject no longer exists"
            );
            return AuthError::UnknownAdmin.into_response();
        }
        Err(e) => return Error::from(e).into_response(),
    }

    req.extensions_mut().insert(principal);
    next.run(req).await
}
