use super::shutdown_signal;
use crate::di::{CodeUnit, Container, Injectable, ResolutionPolicy, Scanner, ScannerConfig};
use crate::error::Result;
use crate::feature::{FeatureModule, FeatureModuleDirectory, RouteTable};
use crate::guard::{AuthorizationGate, AuthorizationPolicy, DenyAll};
use crate::module::Module;
use crate::state::AppState;
use axum::Router;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::Route;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::{Layer, Service};

type PolicyFactory = Box<dyn FnOnce(&Container) -> Result<Arc<dyn AuthorizationPolicy>>>;

/// A composed application: the container, the gated router and its manifest.
///
/// # Example
///
/// ```rust,ignore
/// let app = Application::builder()
///     .module::<AppModule>()
///     .config(ScannerConfig::from_config(&config)?)
///     .authorization_from(|container| Ok(RequireBearer::new(container.resolve::<JwtTokens>()?)))
///     .build()?;
///
/// app.serve(TcpListener::bind("127.0.0.1:3000").await?).await?;
/// ```
pub struct Application {
    container: Arc<Container>,
    routes: Arc<RouteTable>,
    router: Router,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn route_table(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// The composed router with its state applied.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Wrap every route, the authorization gate included, in `layer`.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.router = self.router.layer(layer);
        self
    }

    /// Serve until Ctrl+C or SIGTERM, then drain in-flight requests.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Listening on http://{}", addr);
        }
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Builder for Application
pub struct ApplicationBuilder {
    units: Vec<CodeUnit>,
    directory: FeatureModuleDirectory,
    config: ScannerConfig,
    policy: Option<PolicyFactory>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            directory: FeatureModuleDirectory::new(),
            config: ScannerConfig::default(),
            policy: None,
        }
    }

    /// Add a module's providers and feature modules.
    pub fn module<M: Module>(mut self) -> Self {
        self.units.push(M::unit());
        self.directory.extend(M::features());
        self
    }

    pub fn unit(mut self, unit: CodeUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Register one injectable outside any module.
    pub fn provider<T: Injectable>(self) -> Self {
        let name = std::any::type_name::<T>();
        self.unit(CodeUnit::new(name).injectable::<T>())
    }

    pub fn feature<F: FeatureModule + Default>(mut self) -> Self {
        self.directory.register::<F>();
        self
    }

    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn policy(mut self, policy: ResolutionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn authorization(mut self, policy: impl AuthorizationPolicy) -> Self {
        let policy: Arc<dyn AuthorizationPolicy> = Arc::new(policy);
        self.policy = Some(Box::new(move |_| Ok(policy)));
        self
    }

    /// Build the authorization policy from the finished container.
    pub fn authorization_from<P, F>(mut self, factory: F) -> Self
    where
        P: AuthorizationPolicy,
        F: FnOnce(&Container) -> Result<P> + 'static,
    {
        self.policy = Some(Box::new(move |container| {
            factory(container).map(|policy| Arc::new(policy) as Arc<dyn AuthorizationPolicy>)
        }));
        self
    }

    /// Run the component scan and the feature composition.
    ///
    /// Any configuration error aborts here, before a listener is bound.
    pub fn build(self) -> Result<Application> {
        tracing::info!("Starting application initialization...");

        let outcome = Scanner::new(self.config).scan(&self.units)?;
        let container = Arc::new(Container::new(outcome));

        let policy = match self.policy {
            Some(factory) => factory(&container)?,
            None => {
                tracing::warn!("No authorization policy configured; non-anonymous routes deny every request");
                Arc::new(DenyAll)
            }
        };

        let routes = self.directory.compose()?;
        let (router, table) = AuthorizationGate::new(policy).apply(routes);
        let routes = Arc::new(table);
        let router = router.with_state(AppState::new(Arc::clone(&container), Arc::clone(&routes)));

        tracing::info!(
            bindings = container.len(),
            routes = routes.len(),
            "Application initialized"
        );
        Ok(Application {
            container,
            routes,
            router,
        })
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("bindings", &self.container.len())
            .field("routes", &self.routes.len())
            .finish()
    }
}
