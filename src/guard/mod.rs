//! Authorization: one policy applied uniformly to every composed route.

mod gate;
mod layer;

pub use gate::AuthorizationGate;
pub use layer::{AuthorizationLayer, AuthorizationMiddleware};

use crate::exception::ProblemDetails;
use async_trait::async_trait;
use axum::http::{HeaderValue, header, request::Parts};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Standard Result type for authorization
/// Ok(()) means allowed
/// Err(GuardError) means denied
pub type GuardResult = Result<(), GuardError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "request denied");
        match self {
            GuardError::Unauthorized(detail) => {
                let mut response = ProblemDetails::unauthorized(detail).into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            GuardError::Forbidden(detail) => ProblemDetails::forbidden(detail).into_response(),
        }
    }
}

/// The policy trait
///
/// Decides whether a request may reach its handler. Policies see the request
/// head only and may attach data (for example the authenticated principal)
/// to the request extensions.
#[async_trait]
pub trait AuthorizationPolicy: Send + Sync + 'static {
    async fn authorize(&self, parts: &mut Parts) -> GuardResult;
}

/// Lets every request through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AuthorizationPolicy for AllowAll {
    async fn authorize(&self, _parts: &mut Parts) -> GuardResult {
        Ok(())
    }
}

/// Rejects every request that is not explicitly anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

#[async_trait]
impl AuthorizationPolicy for DenyAll {
    async fn authorize(&self, _parts: &mut Parts) -> GuardResult {
        Err(GuardError::Unauthorized("Authentication is required".to_string()))
    }
}

/// Validates bearer tokens.
pub trait TokenValidator: Send + Sync + 'static {
    type Principal: Clone + Send + Sync + 'static;

    fn validate(&self, token: &str) -> Result<Self::Principal, GuardError>;
}

/// Requires an `Authorization: Bearer <token>` header accepted by `V`.
///
/// The validated principal is inserted into the request extensions, where
/// handlers can read it with `Extension<V::Principal>`.
pub struct RequireBearer<V> {
    validator: Arc<V>,
}

impl<V: TokenValidator> RequireBearer<V> {
    pub fn new(validator: Arc<V>) -> Self {
        Self { validator }
    }
}

impl<V> Clone for RequireBearer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
        }
    }
}

#[async_trait]
impl<V: TokenValidator> AuthorizationPolicy for RequireBearer<V> {
    async fn authorize(&self, parts: &mut Parts) -> GuardResult {
        let token = bearer_token(parts)
            .ok_or_else(|| GuardError::Unauthorized("Missing bearer token".to_string()))?;
        let principal = self.validator.validate(token)?;
        parts.extensions.insert(principal);
        Ok(())
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
