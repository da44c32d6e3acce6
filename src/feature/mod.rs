//! Feature modules and the routes they contribute.

pub mod directory;
pub mod routes;

pub use directory::{FeatureEntry, FeatureModuleDirectory};
pub use routes::{HttpMethod, RouteContribution, RouteDescriptor, RouteGroup, RouteTable};

/// A self-describing unit of HTTP surface.
///
/// Feature modules are stateless and built with `Default`; handlers pull
/// their dependencies per request with [`Inject`](crate::di::Inject).
///
/// ```
/// use forno::prelude::*;
///
/// #[derive(Default)]
/// struct Health;
///
/// impl FeatureModule for Health {
///     fn add_routes(&self, routes: &mut RouteGroup) {
///         routes.get("/health", || async { "ok" }).allow_anonymous();
///     }
/// }
/// ```
pub trait FeatureModule: Send + Sync + 'static {
    fn add_routes(&self, routes: &mut RouteGroup);
}
