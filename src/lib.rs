//! # Forno
//!
//! Declarative service registration and feature-module composition for axum.
//!
//! Forno composes an application in two pipelines that both run once, at
//! startup, and fail loudly on any wiring ambiguity:
//!
//! - **Components**: injectable types are collected from code units, each is
//!   bound under the contracts (traits) it implements, and the frozen
//!   bindings back a request-scoped DI container.
//! - **Features**: feature modules contribute routes to one shared route
//!   group, which is validated and wrapped in a uniform authorization policy.
//!
//! ## Features
//!
//! - **Contract resolution**: bind under the most specific traits only
//!   (`top-level`) or under every implemented trait, inherited ones included
//!   (`full-closure`)
//! - **Lifetimes**: transient, scoped (per request) and singleton
//! - **Parameter injection**: `Inject<dyn Trait>` axum extractor
//! - **Modular Architecture**: organize code with `#[module]` declarations
//! - **Authorization gate**: every route is guarded unless marked anonymous
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forno::prelude::*;
//!
//! // 1. Declare a contract and an implementation
//! #[contract]
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(lifetime = "singleton", contracts(dyn Greeter))]
//! pub struct EnglishGreeter {}
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self, name: &str) -> String {
//!         format!("Hello, {name}!")
//!     }
//! }
//!
//! // 2. Contribute routes from a feature module
//! #[derive(Default)]
//! pub struct GreetingFeature;
//!
//! async fn greet(Inject(greeter): Inject<dyn Greeter>, Path(name): Path<String>) -> String {
//!     greeter.greet(&name)
//! }
//!
//! impl FeatureModule for GreetingFeature {
//!     fn add_routes(&self, routes: &mut RouteGroup) {
//!         routes.get("/hello/{name}", greet).allow_anonymous();
//!     }
//! }
//!
//! // 3. Define your module
//! #[module(providers = [EnglishGreeter], features = [GreetingFeature])]
//! pub struct AppModule;
//!
//! // 4. Bootstrap your application
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let app = Application::builder()
//!         .module::<AppModule>()
//!         .authorization(DenyAll)
//!         .build()?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     app.serve(listener).await?;
//!     Ok(())
//! }
//! ```

extern crate self as forno;

pub mod config;
pub mod di;
pub mod error;
pub mod exception;
pub mod feature;
pub mod guard;
pub mod lifecycle;
pub mod module;
pub mod state;

// Re-export core types
pub use config::ConfigService;
pub use di::{
    CodeUnit, Container, ContainerBuilder, Contract, HasContainer, Inject, Injectable, Lifetime,
    ResolutionPolicy, Scope,
};
pub use error::{FornoError, Result};
pub use exception::ProblemDetails;
pub use feature::{FeatureModule, RouteGroup, RouteTable};
pub use lifecycle::Application;
pub use module::Module;
pub use state::AppState;

// Re-export macros
pub use forno_macro::{Injectable as DeriveInjectable, contract, module};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use forno::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ConfigService;
    pub use crate::di::{
        CodeUnit, Container, ContainerBuilder, Contract, HasContainer, Inject, Injectable,
        Lifetime, ResolutionPolicy, ScannerConfig, Scope,
    };
    pub use crate::error::{FornoError, Result};
    pub use crate::exception::ProblemDetails;
    pub use crate::feature::{FeatureModule, RouteGroup, RouteTable};
    pub use crate::guard::{
        AllowAll, AuthorizationPolicy, DenyAll, GuardError, GuardResult, RequireBearer,
        TokenValidator,
    };
    pub use crate::lifecycle::{Application, ApplicationBuilder, shutdown_signal};
    pub use crate::module::Module;
    pub use crate::state::AppState;
    pub use crate::{DeriveInjectable as Injectable, contract, module};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
