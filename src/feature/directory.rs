use crate::di::ContractId;
use crate::error::{FornoError, Result};
use crate::feature::{FeatureModule, RouteGroup};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

/// A registered feature module type and how to instantiate it.
#[derive(Clone, Copy)]
pub struct FeatureEntry {
    id: ContractId,
    factory: fn() -> Box<dyn FeatureModule>,
}

impl FeatureEntry {
    pub fn of<F: FeatureModule + Default>() -> Self {
        Self {
            id: ContractId::of::<F>(),
            factory: || Box::new(F::default()) as Box<dyn FeatureModule>,
        }
    }

    pub fn name(&self) -> String {
        self.id.short_name()
    }

    pub fn instantiate(&self) -> Box<dyn FeatureModule> {
        (self.factory)()
    }
}

impl PartialEq for FeatureEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for FeatureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeatureEntry").field(&self.id).finish()
    }
}

/// Registry of feature modules.
///
/// Each module type is registered once; [`compose`](Self::compose)
/// instantiates all of them against one shared [`RouteGroup`].
#[derive(Debug, Default)]
pub struct FeatureModuleDirectory {
    entries: Vec<FeatureEntry>,
}

impl FeatureModuleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F: FeatureModule + Default>(&mut self) -> &mut Self {
        self.add(FeatureEntry::of::<F>());
        self
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = FeatureEntry>) -> &mut Self {
        for entry in entries {
            self.add(entry);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, entry: FeatureEntry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    /// Collect the routes of every registered module and validate them.
    pub fn compose(&self) -> Result<RouteGroup> {
        let mut routes = RouteGroup::new();
        for entry in &self.entries {
            let module = entry.instantiate();
            routes.set_module(&entry.name());
            module.add_routes(&mut routes);
        }
        validate(&routes)?;

        tracing::info!(
            modules = self.entries.len(),
            routes = routes.len(),
            "Feature modules composed"
        );
        Ok(routes)
    }
}

/// Rejects malformed paths, duplicate `(method, path)` pairs and paths that
/// differ only in parameter names.
fn validate(routes: &RouteGroup) -> Result<()> {
    let mut exact: HashMap<String, &str> = HashMap::new();
    let mut shapes: HashMap<String, (&str, &str)> = HashMap::new();

    for contribution in routes.routes() {
        let descriptor = contribution.descriptor();
        let route = descriptor.route();
        let module = descriptor.module.as_str();
        let path = contribution.path();
        let shape = shape_of(path).map_err(|reason| FornoError::InvalidRoute {
            route: route.clone(),
            reason,
        })?;

        if let Some(first) = exact.insert(route.clone(), module) {
            return Err(FornoError::RouteCollision {
                route,
                first: first.to_string(),
                second: module.to_string(),
            });
        }

        match shapes.entry(shape) {
            Entry::Occupied(entry) => {
                let (other, owner) = *entry.get();
                if other != path {
                    return Err(FornoError::InvalidRoute {
                        route,
                        reason: format!(
                            "same shape as '{other}' from {owner} but different parameter names"
                        ),
                    });
                }
            }
            Entry::Vacant(entry) => {
                entry.insert((path, module));
            }
        }
    }
    Ok(())
}

/// The path with every `{param}` replaced by `{}`.
fn shape_of(path: &str) -> std::result::Result<String, String> {
    if !path.starts_with('/') {
        return Err("path must start with '/'".to_string());
    }

    let mut shape = String::with_capacity(path.len());
    let mut param = String::new();
    let mut in_param = false;
    for ch in path.chars() {
        match ch {
            '{' if in_param => return Err("nested '{' in path parameter".to_string()),
            '{' => {
                in_param = true;
                param.clear();
            }
            '}' if !in_param => return Err("unmatched '}'".to_string()),
            '}' => {
                if param.trim_start_matches('*').is_empty() {
                    return Err("empty path parameter name".to_string());
                }
                shape.push_str("{}");
                in_param = false;
            }
            '/' if in_param => return Err("unterminated path parameter".to_string()),
            _ if in_param => param.push(ch),
            _ => shape.push(ch),
        }
    }
    if in_param {
        return Err("unterminated path parameter".to_string());
    }
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn ok() -> StatusCode {
        StatusCode::OK
    }

    #[derive(Default)]
    struct Ingredients;
    impl FeatureModule for Ingredients {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.get("/x", ok);
        }
    }

    #[derive(Default)]
    struct Pizzas;
    impl FeatureModule for Pizzas {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.post("/y", ok);
        }
    }

    #[derive(Default)]
    struct Shadow;
    impl FeatureModule for Shadow {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.get("/x", ok);
        }
    }

    #[derive(Default)]
    struct ById;
    impl FeatureModule for ById {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.get("/items/{id}", ok);
            routes.delete("/items/{id}", ok);
        }
    }

    #[derive(Default)]
    struct ByName;
    impl FeatureModule for ByName {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.put("/items/{name}", ok);
        }
    }

    #[derive(Default)]
    struct Broken;
    impl FeatureModule for Broken {
        fn add_routes(&self, routes: &mut RouteGroup) {
            routes.get("/items/{id", ok);
        }
    }

    #[test]
    fn test_compose_aggregates_all_modules() {
        let mut directory = FeatureModuleDirectory::new();
        directory.register::<Ingredients>().register::<Pizzas>();
        let routes = directory.compose().unwrap();
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn test_registering_twice_is_a_no_op() {
        let mut directory = FeatureModuleDirectory::new();
        directory
            .register::<Ingredients>()
            .extend([FeatureEntry::of::<Ingredients>()]);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.compose().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_route_across_modules() {
        let mut directory = FeatureModuleDirectory::new();
        directory.register::<Ingredients>().register::<Shadow>();
        match directory.compose() {
            Err(FornoError::RouteCollision { route, first, second }) => {
                assert_eq!(route, "GET /x");
                assert_eq!(first, "Ingredients");
                assert_eq!(second, "Shadow");
            }
            other => panic!("expected a collision, got {other:?}"),
        }
    }

    #[test]
    fn test_same_shape_with_other_parameter_names() {
        let mut directory = FeatureModuleDirectory::new();
        directory.register::<ById>().register::<ByName>();
        let err = directory.compose().unwrap_err();
        assert!(matches!(err, FornoError::InvalidRoute { ref route, .. } if route == "PUT /items/{name}"));
    }

    #[test]
    fn test_malformed_path() {
        let mut directory = FeatureModuleDirectory::new();
        directory.register::<Broken>();
        assert!(matches!(
            directory.compose(),
            Err(FornoError::InvalidRoute { .. })
        ));
    }

    #[test]
    fn test_shape_of() {
        assert_eq!(shape_of("/a/{id}/b").unwrap(), "/a/{}/b");
        assert_eq!(shape_of("/files/{*rest}").unwrap(), "/files/{}");
        assert!(shape_of("relative").is_err());
        assert!(shape_of("/a/{}").is_err());
        assert!(shape_of("/a/}").is_err());
    }
}
