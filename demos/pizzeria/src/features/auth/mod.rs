//! Login and the authenticated principal.

use crate::domain::DomainError;
use crate::infrastructure::{Claims, InfrastructureModule, IssuedToken, JwtTokens};
use axum::Extension;
use chrono::{DateTime, Utc};
use forno::prelude::{
    ConfigService, FeatureModule, Inject, Injectable, Json, RouteGroup, StatusCode, contract,
    module,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const USERNAME_KEY: &str = "ADMIN_USERNAME";
pub const PASSWORD_KEY: &str = "ADMIN_PASSWORD";

#[module(
    imports = [InfrastructureModule],
    providers = [AdminAuthenticator],
    features = [AuthFeature],
)]
pub struct AuthModule;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[contract]
pub trait Authenticator: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<IssuedToken, DomainError>;
}

/// Accepts the single administrator account from `ADMIN_USERNAME` and
/// `ADMIN_PASSWORD` (`admin` / `admin123` when unset).
#[derive(Injectable)]
#[injectable(contracts(dyn Authenticator))]
pub struct AdminAuthenticator {
    config: Arc<ConfigService>,
    tokens: Arc<JwtTokens>,
}

impl Authenticator for AdminAuthenticator {
    fn login(&self, credentials: &Credentials) -> Result<IssuedToken, DomainError> {
        let username = self.config.get_or(USERNAME_KEY, "admin");
        let password = self.config.get_or(PASSWORD_KEY, "admin123");
        if credentials.username != username || credentials.password != password {
            tracing::warn!(username = %credentials.username, "login rejected");
            return Err(DomainError::InvalidCredentials);
        }
        self.tokens.issue(&credentials.username)
    }
}

#[derive(Default)]
pub struct AuthFeature;

impl FeatureModule for AuthFeature {
    fn add_routes(&self, routes: &mut RouteGroup) {
        routes.group("/auth", |group| {
            group
                .post("/login", login)
                .name("Login")
                .summary("Exchange credentials for a bearer token")
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::UNAUTHORIZED)
                .allow_anonymous();
            group
                .get("/me", me)
                .name("CurrentUser")
                .summary("The authenticated user")
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::UNAUTHORIZED);
        });
    }
}

async fn login(
    Inject(authenticator): Inject<dyn Authenticator>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<IssuedToken>, DomainError> {
    authenticator.login(&credentials).map(Json)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUser {
    username: String,
    expires_at: Option<DateTime<Utc>>,
}

async fn me(Extension(claims): Extension<Claims>) -> Json<CurrentUser> {
    Json(CurrentUser {
        username: claims.sub,
        expires_at: DateTime::from_timestamp(claims.exp as i64, 0),
    })
}
