use crate::feature::{RouteGroup, RouteTable};
use crate::guard::{AuthorizationLayer, AuthorizationPolicy};
use crate::state::AppState;
use axum::Router;
use axum::routing::MethodRouter;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Wraps a composed route group in one authorization policy.
///
/// Every route requires the policy's approval unless it was contributed with
/// `allow_anonymous()`.
#[derive(Clone)]
pub struct AuthorizationGate {
    policy: Arc<dyn AuthorizationPolicy>,
}

impl AuthorizationGate {
    pub fn new(policy: Arc<dyn AuthorizationPolicy>) -> Self {
        Self { policy }
    }

    /// Turn the validated routes into a router plus their manifest.
    pub fn apply(&self, routes: RouteGroup) -> (Router<AppState>, RouteTable) {
        let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();
        let mut descriptors = Vec::new();
        let mut gated = 0;

        for contribution in routes.into_routes() {
            let handler = if contribution.descriptor.requires_authorization {
                gated += 1;
                contribution
                    .handler
                    .route_layer(AuthorizationLayer::new(Arc::clone(&self.policy)))
            } else {
                contribution.handler
            };

            let merged = match by_path.remove(&contribution.path) {
                Some(existing) => existing.merge(handler),
                None => handler,
            };
            by_path.insert(contribution.path, merged);
            descriptors.push(contribution.descriptor);
        }

        let router = by_path
            .into_iter()
            .fold(Router::new(), |router, (path, handler)| router.route(&path, handler));
        let table = RouteTable::new(descriptors);

        tracing::info!(
            routes = table.len(),
            gated,
            anonymous = table.len() - gated,
            "Authorization gate applied"
        );
        (router, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::ContainerBuilder;
    use crate::feature::{FeatureModule, FeatureModuleDirectory, HttpMethod};
    use crate::guard::{AllowAll, DenyAll};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn ok() -> &'static str {
        "ok"
    }

    #[derive(Default)]
    struct Reads;
    impl FeatureModule for Reads {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.get("/x", ok);
        }
    }

    #[derive(Default)]
    struct Writes;
    impl FeatureModule for Writes {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.post("/y", ok);
            routes.get("/y", ok).allow_anonymous();
        }
    }

    fn compose(policy: Arc<dyn AuthorizationPolicy>) -> (Router, RouteTable) {
        let mut directory = FeatureModuleDirectory::new();
        directory.register::<Reads>().register::<Writes>();
        let routes = directory.compose().unwrap();
        let (router, table) = AuthorizationGate::new(policy).apply(routes);

        let container = Arc::new(ContainerBuilder::new().build().unwrap());
        let state = AppState::new(container, Arc::new(table.clone()));
        (router.with_state(state), table)
    }

    async fn status(router: &Router, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_every_contributed_route_is_gated() {
        let (router, table) = compose(Arc::new(DenyAll));
        assert_eq!(table.len(), 3);
        assert!(table.find(HttpMethod::Get, "/x").unwrap().requires_authorization);
        assert!(table.find(HttpMethod::Post, "/y").unwrap().requires_authorization);

        assert_eq!(status(&router, "GET", "/x").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(&router, "POST", "/y").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_route_bypasses_deny_all() {
        let (router, table) = compose(Arc::new(DenyAll));
        assert!(!table.find(HttpMethod::Get, "/y").unwrap().requires_authorization);
        assert_eq!(status(&router, "GET", "/y").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_allow_all_reaches_handlers() {
        let (router, _) = compose(Arc::new(AllowAll));
        assert_eq!(status(&router, "GET", "/x").await, StatusCode::OK);
        assert_eq!(status(&router, "POST", "/y").await, StatusCode::OK);
        assert_eq!(status(&router, "DELETE", "/y").await, StatusCode::METHOD_NOT_ALLOWED);
    }
}
