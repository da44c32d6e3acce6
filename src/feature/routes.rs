use crate::state::AppState;
use axum::handler::Handler;
use axum::http::StatusCode;
use axum::routing::{self, MethodRouter};
use serde::Serialize;
use std::fmt;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// One route contributed by a feature module.
///
/// Returned by the [`RouteGroup`] verbs so metadata can be chained onto it.
pub struct RouteContribution {
    pub(crate) method: HttpMethod,
    pub(crate) path: String,
    pub(crate) handler: MethodRouter<AppState>,
    pub(crate) descriptor: RouteDescriptor,
}

impl RouteContribution {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.descriptor.name = Some(name.into());
        self
    }

    pub fn summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.descriptor.summary = Some(summary.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.descriptor.description = Some(description.into());
        self
    }

    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        let tag = tag.into();
        if !self.descriptor.tags.contains(&tag) {
            self.descriptor.tags.push(tag);
        }
        self
    }

    /// Declare a success status this route may produce.
    pub fn produces(&mut self, status: StatusCode) -> &mut Self {
        push_status(&mut self.descriptor.produces, status);
        self
    }

    /// Declare a problem-details status this route may produce.
    pub fn produces_problem(&mut self, status: StatusCode) -> &mut Self {
        push_status(&mut self.descriptor.problems, status);
        self
    }

    /// Exempt this route from the authorization gate.
    pub fn allow_anonymous(&mut self) -> &mut Self {
        self.descriptor.requires_authorization = false;
        self
    }
}

fn push_status(codes: &mut Vec<u16>, status: StatusCode) {
    let code = status.as_u16();
    if !codes.contains(&code) {
        codes.push(code);
    }
}

impl fmt::Debug for RouteContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteContribution")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Serializable metadata of one route; an entry of the route manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub produces: Vec<u16>,
    pub problems: Vec<u16>,
    pub requires_authorization: bool,
}

impl RouteDescriptor {
    /// `GET /ingredients/{id}`
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// The shared builder every feature module contributes its routes to.
///
/// Routes registered inside [`group`](Self::group) get the group's path
/// prefix and tag.
#[derive(Debug, Default)]
pub struct RouteGroup {
    module: String,
    prefix: String,
    tag: Option<String>,
    routes: Vec<RouteContribution>,
}

impl RouteGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<H, T>(&mut self, path: &str, handler: H) -> &mut RouteContribution
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.push(HttpMethod::Get, path, routing::get(handler))
    }

    pub fn post<H, T>(&mut self, path: &str, handler: H) -> &mut RouteContribution
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.push(HttpMethod::Post, path, routing::post(handler))
    }

    pub fn put<H, T>(&mut self, path: &str, handler: H) -> &mut RouteContribution
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.push(HttpMethod::Put, path, routing::put(handler))
    }

    pub fn patch<H, T>(&mut self, path: &str, handler: H) -> &mut RouteContribution
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.push(HttpMethod::Patch, path, routing::patch(handler))
    }

    pub fn delete<H, T>(&mut self, path: &str, handler: H) -> &mut RouteContribution
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.push(HttpMethod::Delete, path, routing::delete(handler))
    }

    /// Register routes under a common prefix, tagged with the last prefix
    /// segment.
    pub fn group(&mut self, prefix: &str, build: impl FnOnce(&mut RouteGroup)) -> &mut Self {
        let joined = join_path(&self.prefix, prefix);
        let outer_prefix = std::mem::replace(&mut self.prefix, joined);
        let tag = prefix
            .trim_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
            .map(str::to_string)
            .or_else(|| self.tag.clone());
        let outer_tag = std::mem::replace(&mut self.tag, tag);

        build(self);

        self.prefix = outer_prefix;
        self.tag = outer_tag;
        self
    }

    pub fn routes(&self) -> &[RouteContribution] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn set_module(&mut self, module: &str) {
        self.module = module.to_string();
        self.prefix.clear();
        self.tag = None;
    }

    pub(crate) fn into_routes(self) -> Vec<RouteContribution> {
        self.routes
    }

    fn push(
        &mut self,
        method: HttpMethod,
        path: &str,
        handler: MethodRouter<AppState>,
    ) -> &mut RouteContribution {
        let path = join_path(&self.prefix, path);
        let descriptor = RouteDescriptor {
            method,
            path: path.clone(),
            module: self.module.clone(),
            name: None,
            summary: None,
            description: None,
            tags: self.tag.iter().cloned().collect(),
            produces: Vec::new(),
            problems: Vec::new(),
            requires_authorization: true,
        };
        tracing::debug!(module = %self.module, route = %descriptor.route(), "route contributed");

        let index = self.routes.len();
        self.routes.push(RouteContribution {
            method,
            path,
            handler,
            descriptor,
        });
        &mut self.routes[index]
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    let prefix = prefix.trim_end_matches('/');
    match path {
        "" | "/" => prefix.to_string(),
        _ if path.starts_with('/') => format!("{prefix}{path}"),
        _ => format!("{prefix}/{path}"),
    }
}

/// The immutable route manifest of a composed application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub(crate) fn new(mut routes: Vec<RouteDescriptor>) -> Self {
        routes.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
        Self { routes }
    }

    pub fn manifest(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn find(&self, method: HttpMethod, path: &str) -> Option<&RouteDescriptor> {
        self.routes
            .iter()
            .find(|route| route.method == method && route.path == path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok() -> StatusCode {
        StatusCode::OK
    }

    #[test]
    fn test_group_prefixes_and_tags_routes() {
        let mut routes = RouteGroup::new();
        routes.set_module("IngredientFeature");
        routes.group("/ingredients", |group| {
            group.get("/", ok).name("ListIngredients");
            group
                .get("/{id}", ok)
                .produces(StatusCode::OK)
                .produces_problem(StatusCode::NOT_FOUND);
        });
        routes.get("/health", ok).allow_anonymous();

        let descriptors: Vec<_> = routes.routes().iter().map(|r| r.descriptor().clone()).collect();
        assert_eq!(descriptors[0].path, "/ingredients");
        assert_eq!(descriptors[0].tags, vec!["ingredients".to_string()]);
        assert_eq!(descriptors[0].name.as_deref(), Some("ListIngredients"));
        assert_eq!(descriptors[1].route(), "GET /ingredients/{id}");
        assert_eq!(descriptors[1].problems, vec![404]);
        assert_eq!(descriptors[2].path, "/health");
        assert!(descriptors[2].tags.is_empty());
        assert!(!descriptors[2].requires_authorization);
        assert_eq!(descriptors[2].module, "IngredientFeature");
    }

    #[test]
    fn test_nested_groups_restore_outer_prefix() {
        let mut routes = RouteGroup::new();
        routes.group("/api", |api| {
            api.group("/pizzas", |pizzas| {
                pizzas.get("/{id}", ok);
            });
            api.get("/status", ok);
        });
        routes.get("/", ok);

        let paths: Vec<_> = routes.routes().iter().map(|r| r.descriptor().path.clone()).collect();
        assert_eq!(paths, vec!["/api/pizzas/{id}", "/api/status", "/"]);
        assert_eq!(routes.routes()[0].descriptor().tags, vec!["pizzas".to_string()]);
        assert_eq!(routes.routes()[1].descriptor().tags, vec!["api".to_string()]);
    }

    #[test]
    fn test_manifest_serializes_in_path_order() {
        let mut routes = RouteGroup::new();
        routes.set_module("Pizza");
        routes.post("/pizzas", ok).tag("pizzas");
        routes.get("/ingredients", ok);

        let table = RouteTable::new(
            routes
                .into_routes()
                .into_iter()
                .map(|r| r.descriptor)
                .collect(),
        );
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["path"], "/ingredients");
        assert_eq!(json[1]["method"], "POST");
        assert_eq!(json[1]["requiresAuthorization"], true);
        assert!(table.find(HttpMethod::Post, "/pizzas").is_some());
    }
}
